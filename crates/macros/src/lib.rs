/*
 * SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: LicenseRef-NvidiaProprietary
 *
 * NVIDIA CORPORATION, its affiliates and licensors retain all intellectual
 * property and proprietary rights in and to this material, related
 * documentation and any modifications thereto. Any use, reproduction,
 * disclosure or distribution of this material and related documentation
 * without an express license agreement from NVIDIA CORPORATION or
 * its affiliates is strictly prohibited.
 */

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{LitStr, Meta, Token};

type AttributeArgs = syn::punctuated::Punctuated<syn::Meta, syn::Token![,]>;

/// Name of the cfg a crate's build script sets when `DATABASE_URL` is unset.
const NO_DATABASE_CFG: &str = "no_test_database";

/// Database test attribute, used instead of `#[sqlx::test]`.
///
/// The test takes a single `sqlx::PgPool` and runs on its own copy of the
/// migrated template database, with the named fixtures from
/// `sqlx_testing::FIXTURES` loaded in order.
///
/// ```ignore
/// #[crate::sqlx_test(fixtures("dcim", "fsu_types"))]
/// async fn creates_a_gpu(pool: sqlx::PgPool) { /* ... */ }
/// ```
///
/// expands to roughly
///
/// ```ignore
/// #[test]
/// #[cfg_attr(no_test_database, ignore = "DATABASE_URL was not set at build time")]
/// fn creates_a_gpu() {
///     async fn creates_a_gpu(pool: sqlx::PgPool) { /* ... */ }
///     sqlx_testing::run("db::fsu::tests::creates_a_gpu", &["dcim", "fsu_types"], creates_a_gpu)
/// }
/// ```
///
/// The using crate depends on `sqlx_testing` and has a build script that
/// sets `no_test_database` when `DATABASE_URL` is unset.
#[proc_macro_attribute]
pub fn sqlx_test(args: TokenStream, input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::ItemFn);
    match expand(args.into(), input) {
        Ok(ts) => ts.into(),
        Err(e) => {
            if let Some(parse_err) = e.downcast_ref::<syn::Error>() {
                parse_err.to_compile_error().into()
            } else {
                let msg = e.to_string();
                quote!(::std::compile_error!(#msg)).into()
            }
        }
    }
}

fn expand(args: TokenStream2, input: syn::ItemFn) -> eyre::Result<TokenStream2> {
    let ret = &input.sig.output;
    let name = &input.sig.ident;
    let inputs = &input.sig.inputs;
    let body = &input.block;
    let attrs = &input.attrs;

    if input.sig.asyncness.is_none() || inputs.len() != 1 {
        return Err(syn::Error::new_spanned(
            &input.sig,
            "expected an async fn taking a single sqlx::PgPool",
        )
        .into());
    }

    let parser = AttributeArgs::parse_terminated;
    let args = parser.parse2(args)?;

    let mut fixtures = Vec::new();
    for arg in args {
        match arg {
            Meta::List(list) if list.path.is_ident("fixtures") => {
                let names =
                    list.parse_args_with(<Punctuated<LitStr, Token![,]>>::parse_terminated)?;
                fixtures.extend(names);
            }
            other => {
                return Err(syn::Error::new_spanned(other, "only fixtures(...) is supported").into());
            }
        }
    }

    let no_database = syn::Ident::new(NO_DATABASE_CFG, proc_macro2::Span::call_site());

    Ok(quote! {
        #(#attrs)*
        #[::core::prelude::v1::test]
        #[cfg_attr(#no_database, ignore = "DATABASE_URL was not set at build time")]
        fn #name() #ret {
            async fn #name(#inputs) #ret {
                #body
            }

            sqlx_testing::run(
                concat!(module_path!(), "::", stringify!(#name)),
                &[#(#fixtures),*],
                #name,
            )
        }
    })
}
