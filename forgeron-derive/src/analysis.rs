use darling::{FromDeriveInput, FromField};
use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DataStruct, DeriveInput, Field, Fields, FieldsNamed, Ident, Path, Type};

use crate::descriptor::{DependencyRequest, InjectionDescriptor, Key, NamedKey};
use crate::error::Error;

/// Analyzes a derive input into an injection descriptor.
///
/// Only supports structs with named fields. Every field becomes one
/// dependency request, in declaration order; fields marked
/// `#[factory(assisted)]` are supplied by the caller at creation time, all
/// others are resolved through providers.
pub struct FactoryAnalysis {
    input: DeriveInput,
}

/// Struct-level `#[factory(...)]` attributes.
#[derive(FromDeriveInput)]
#[darling(attributes(factory))]
pub struct FactoryAttrs {
    /// The factory interface the generated type implements.
    implements: Path,

    /// The factory method to implement, `create` when omitted.
    #[darling(default)]
    method: Option<Ident>,

    /// The factory method's return type, the target type when omitted.
    #[darling(default)]
    returns: Option<Type>,

    /// Comma-separated factory parameter order, the assisted fields in
    /// declaration order when omitted.
    #[darling(default)]
    params: Option<String>,

    /// Opaque marker annotation stamped on the generated type.
    #[darling(default)]
    marker: Option<Path>,
}

/// Field-level `#[factory(...)]` attributes.
#[derive(Clone, Debug, Default, FromField)]
#[darling(attributes(factory))]
pub struct FactoryFieldAttrs {
    #[darling(default)]
    assisted: bool,

    #[darling(default)]
    qualifier: Option<Path>,
}

impl FactoryAnalysis {
    /// Creates a new analysis from a derive input.
    pub fn from(input: DeriveInput) -> Self {
        Self { input }
    }

    /// Performs the analysis and builds the validated descriptor.
    pub fn into_descriptor(self) -> Result<InjectionDescriptor, Error> {
        let attrs = FactoryAttrs::from_derive_input(&self.input)?;
        let requests = self.dependency_requests()?;

        let method = attrs
            .method
            .unwrap_or_else(|| Ident::new("create", Span::call_site()));

        let mut builder =
            InjectionDescriptor::builder(self.input.ident.clone(), attrs.implements, method)
                .target_generics(self.input.generics.clone())
                .dependencies(requests.iter().cloned());

        if let Some(returns) = attrs.returns {
            builder = builder.return_type(returns);
        }
        if let Some(marker) = attrs.marker {
            builder = builder.generated_marker(marker);
        }
        if let Some(params) = attrs.params {
            builder = builder.assisted_keys(declared_keys(&params, &requests)?);
        }

        builder.build()
    }

    /// Maps the fields of a named struct to dependency requests.
    ///
    /// # Errors
    ///
    /// Returns an error for enums, unions, unit structs, or tuple structs.
    fn dependency_requests(&self) -> Result<Vec<DependencyRequest>, Error> {
        self.fields()?
            .into_iter()
            .map(|field| {
                let attrs = FactoryFieldAttrs::from_field(field)?;
                let name = field
                    .ident
                    .clone()
                    .ok_or(Error::UnsupportedDataStructureTupleStruct)?;
                let key = match attrs.qualifier {
                    Some(qualifier) => Key::qualified(field.ty.clone(), qualifier),
                    None => Key::new(field.ty.clone()),
                };

                Ok(DependencyRequest {
                    name,
                    key,
                    is_assisted: attrs.assisted,
                })
            })
            .collect()
    }

    fn fields(&self) -> Result<&Punctuated<Field, Comma>, Error> {
        match &self.input.data {
            Data::Struct(DataStruct {
                fields: Fields::Named(FieldsNamed { named, .. }),
                ..
            }) => Ok(named),
            Data::Struct(DataStruct {
                fields: Fields::Unit,
                ..
            }) => Err(Error::UnsupportedDataStructureUnitStruct),
            Data::Struct(DataStruct {
                fields: Fields::Unnamed(_),
                ..
            }) => Err(Error::UnsupportedDataStructureTupleStruct),
            Data::Enum(_) => Err(Error::UnsupportedDataStructureEnum),
            Data::Union(_) => Err(Error::UnsupportedDataStructureUnion),
        }
    }
}

/// Resolves the caller-declared parameter order against the field list.
///
/// Names are matched against all fields, not just the assisted subset, so
/// that declaring a provided field trips the assisted-key invariant rather
/// than reporting an unknown name.
fn declared_keys(params: &str, requests: &[DependencyRequest]) -> Result<Vec<NamedKey>, Error> {
    params
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            requests
                .iter()
                .find(|request| request.name == name)
                .map(DependencyRequest::named_key)
                .ok_or_else(|| Error::UnknownParameter(name.to_owned()))
        })
        .collect()
}
