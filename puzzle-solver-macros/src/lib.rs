//! Procedural macros for the puzzle-solver library

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{DeriveInput, Lit, parse_macro_input};

/// Derive macro for automatically registering problem sets with the plugin table
///
/// The generated registration records `module_path!()` of the deriving type; the
/// module below the owning collection's root names the set's author.
///
/// # Attributes
///
/// - `tags`: Optional. `#[puzzle(tags = ["easy", "grid"])]`, used to filter built-ins
///
/// # Requirements
///
/// The type must implement `ProblemSet` and `Default`. If it does not, you get a
/// compile-time error pointing at the type:
///
/// ```text
/// error[E0277]: the trait bound `Day1: ProblemSet` is not satisfied
/// ```
///
/// # Example
///
/// ```ignore
/// use puzzle_solver::AutoRegisterProblemSet;
///
/// #[derive(Default, AutoRegisterProblemSet)]
/// #[puzzle(tags = ["easy"])]
/// pub struct Day1;
///
/// impl puzzle_solver::ProblemSet for Day1 {
///     // ... implementation
/// }
/// ```
#[proc_macro_derive(AutoRegisterProblemSet, attributes(puzzle))]
pub fn derive_auto_register_problem_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "AutoRegisterProblemSet cannot be derived for generic types",
        ));
    }

    let mut tags: Vec<String> = Vec::new();
    for attr in input.attrs.iter().filter(|attr| attr.path().is_ident("puzzle")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tags") {
                // Parse array of string literals: tags = ["a", "b"]
                let _ = meta.value()?;
                let content;
                syn::bracketed!(content in meta.input);
                while !content.is_empty() {
                    match content.parse::<Lit>()? {
                        Lit::Str(lit_str) => tags.push(lit_str.value()),
                        other => return Err(syn::Error::new_spanned(other, "tags must be string literals")),
                    }
                    if content.peek(syn::Token![,]) {
                        let _: syn::Token![,] = content.parse()?;
                    }
                }
                Ok(())
            } else {
                Err(meta.error("unsupported puzzle attribute, expected `tags`"))
            }
        })?;
    }

    let factory = format_ident!("__puzzle_problem_set_factory_{}", name);

    Ok(quote! {
        const _: () = {
            trait MustImplementProblemSet: ::puzzle_solver::ProblemSet + ::core::default::Default {}
            impl MustImplementProblemSet for #name {}
        };

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #factory() -> ::std::sync::Arc<dyn ::puzzle_solver::ProblemSet> {
            ::std::sync::Arc::new(<#name as ::core::default::Default>::default())
        }

        ::puzzle_solver::inventory::submit! {
            ::puzzle_solver::ProblemSetPlugin {
                module: ::core::module_path!(),
                factory: #factory,
                tags: &[#(#tags),*],
            }
        }
    })
}
