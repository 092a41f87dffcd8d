//! Procedural macros for generating assisted-injection factories.
//!
//! This crate provides the `#[derive(AssistedFactory)]` macro. The annotated
//! struct's fields split into two kinds: fields marked `#[factory(assisted)]`
//! are supplied by the caller each time an instance is created, all others
//! are resolved by the dependency-injection framework through lazy
//! providers. The macro generates a peer type implementing a caller-declared
//! factory trait whose single method accepts exactly the assisted values.

use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, ItemStruct, parse_macro_input};

use crate::analysis::FactoryAnalysis;
use crate::codegen::FactoryCodegen;

mod analysis;
mod codegen;
mod descriptor;
mod error;

/// Derives an assisted-injection factory for the annotated struct.
///
/// The generated type is named `<Target>_AssistedFactory`, stores one
/// `forgeron::Provider` per non-assisted field (fields already typed as a
/// provider keep their exact type), and exposes a framework-injectable
/// `new` constructor taking the providers in field order.
///
/// # Struct Attributes
///
/// - `#[factory(implements = "FactoryTrait")]` - The factory trait the
///   generated type implements. Required.
/// - `#[factory(method = "name")]` - The trait method to implement,
///   `create` when omitted.
/// - `#[factory(returns = "Type")]` - The method's return type, the target
///   type when omitted.
/// - `#[factory(params = "b, a")]` - The method's parameter order; must name
///   exactly the assisted fields, in any order. Defaults to declaration
///   order.
/// - `#[factory(marker = "path")]` - An annotation stamped on the generated
///   type.
///
/// # Field Attributes
///
/// - `#[factory(assisted)]` - The field is supplied by the caller at
///   creation time instead of being resolved from a provider.
/// - `#[factory(qualifier = "path")]` - A qualifier forwarded to the
///   generated provider field.
#[proc_macro_derive(AssistedFactory, attributes(factory))]
pub fn derive_assisted_factory(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    FactoryAnalysis::from(input)
        .into_descriptor()
        .map(|descriptor| FactoryCodegen::new(descriptor).generate())
        .unwrap_or_else(|err| syn::Error::from(err).into_compile_error())
        .into()
}

/// Marks a constructor as injectable by the framework.
///
/// The attribute is a marker: the container recognizes it when wiring the
/// factory, the tokens pass through untouched.
#[proc_macro_attribute]
pub fn inject(_attr: TokenStream, item: TokenStream) -> TokenStream {
    item
}

/// Marks a struct as framework-injectable and consumes the
/// `#[qualified(...)]` attributes generation leaves on its fields.
#[proc_macro_attribute]
pub fn injectable(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut input = parse_macro_input!(item as ItemStruct);
    for field in input.fields.iter_mut() {
        field.attrs.retain(|attr| !attr.path().is_ident("qualified"));
    }

    quote!(#input).into()
}
