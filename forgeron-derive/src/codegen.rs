use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::visit::Visit;
use syn::{Ident, Path, Type, TypeParam};

use crate::descriptor::{DependencyRequest, InjectionDescriptor, NamedKey};

/// The derived description of one generated factory.
///
/// Storage order and call order are distinct on purpose: `fields` (and the
/// constructor parameters derived from them) follow the provided requests in
/// request order, the method parameters follow the declared assisted keys,
/// and the body arguments follow the full request list.
pub struct FactoryModel {
    /// The generated type's name.
    pub ident: Ident,
    /// The target type being constructed.
    pub target: Ident,
    /// The factory interface the generated type implements.
    pub trait_path: Path,
    /// Opaque marker annotation stamped on the generated type.
    pub marker: Option<Path>,
    /// Stored providers, one per provided dependency, request order.
    pub fields: Vec<ProviderField>,
    /// The factory method description.
    pub method: FactoryMethod,
}

/// A stored provider field of the generated factory.
pub struct ProviderField {
    pub name: Ident,
    pub ty: Type,
    pub qualifier: Option<Path>,
}

/// The factory method of the generated factory.
pub struct FactoryMethod {
    pub name: Ident,
    /// Target type variables redeclared on the method itself.
    pub type_params: Vec<TypeParam>,
    /// Parameters in declared assisted-key order.
    pub params: Vec<(Ident, Type)>,
    pub return_type: Type,
    /// Construction arguments in dependency-request order.
    pub args: Vec<Argument>,
}

/// How one construction argument of the target is produced.
pub enum Argument {
    /// An assisted value, taken from the factory method parameter.
    Param(Ident),
    /// A provided dependency that is already a provider; the stored handle
    /// passes through without being resolved.
    Field(Ident),
    /// A provided dependency resolved freshly from its stored provider.
    Resolved(Ident),
}

impl FactoryModel {
    /// Runs the transform for a validated descriptor.
    ///
    /// Total: every validated descriptor yields a model.
    pub fn from_descriptor(descriptor: &InjectionDescriptor) -> Self {
        Self {
            ident: factory_ident(descriptor.target_ident()),
            target: descriptor.target_ident().clone(),
            trait_path: descriptor.factory_type().clone(),
            marker: descriptor.generated_marker().cloned(),
            fields: descriptor.provided_requests().map(provider_field).collect(),
            method: factory_method(descriptor),
        }
    }

    /// Constructor parameters: one per stored field, same order, same names.
    pub fn constructor_params(&self) -> impl Iterator<Item = (&Ident, &Type)> {
        self.fields.iter().map(|field| (&field.name, &field.ty))
    }
}

/// Derives `<Target>_AssistedFactory`. The derive expands adjacent to its
/// input, so the generated type is a peer of the target in the same module.
fn factory_ident(target: &Ident) -> Ident {
    format_ident!("{}_AssistedFactory", target)
}

/// Decides the stored type for one provided dependency.
///
/// Keys that already name a provider keep their exact type: wrapping them
/// again would hand the constructor a provider of a provider. Everything
/// else is deferred behind `forgeron::Provider`. Qualifiers survive the
/// wrapping and ride on the generated field.
fn provider_field(request: &DependencyRequest) -> ProviderField {
    let ty = if request.key.is_provider() {
        request.key.ty.clone()
    } else {
        let inner = &request.key.ty;
        syn::parse_quote!(forgeron::Provider<#inner>)
    };

    ProviderField {
        name: request.name.clone(),
        ty,
        qualifier: request.key.qualifier.clone(),
    }
}

fn factory_method(descriptor: &InjectionDescriptor) -> FactoryMethod {
    let args = descriptor
        .dependency_requests()
        .iter()
        .map(|request| {
            if request.is_assisted {
                Argument::Param(request.name.clone())
            } else if request.key.is_provider() {
                Argument::Field(request.name.clone())
            } else {
                Argument::Resolved(request.name.clone())
            }
        })
        .collect();

    FactoryMethod {
        name: descriptor.factory_method_name().clone(),
        type_params: propagated_type_params(descriptor),
        params: descriptor
            .assisted_keys()
            .iter()
            .map(|key| (key.name.clone(), key.key.ty.clone()))
            .collect(),
        return_type: descriptor.return_type().clone(),
        args,
    }
}

/// Target type variables mentioned by assisted parameter types, with their
/// bounds, for redeclaration on the generated method. Keeping them on the
/// method leaves the factory type itself non-generic.
fn propagated_type_params(descriptor: &InjectionDescriptor) -> Vec<TypeParam> {
    descriptor
        .target_generics()
        .type_params()
        .filter(|param| {
            descriptor
                .assisted_keys()
                .iter()
                .any(|key| mentions(key, &param.ident))
        })
        .cloned()
        .collect()
}

/// Whether the key's type mentions `ident` anywhere in a path.
fn mentions(key: &NamedKey, ident: &Ident) -> bool {
    struct Finder<'a> {
        ident: &'a Ident,
        found: bool,
    }

    impl<'ast> Visit<'ast> for Finder<'_> {
        fn visit_ident(&mut self, node: &'ast Ident) {
            if node == self.ident {
                self.found = true;
            }
        }
    }

    let mut finder = Finder {
        ident,
        found: false,
    };
    finder.visit_type(&key.key.ty);
    finder.found
}

/// Code generator for assisted factory implementations.
pub struct FactoryCodegen {
    model: FactoryModel,
}

impl FactoryCodegen {
    /// Creates a code generator from the given validated descriptor.
    pub fn new(descriptor: InjectionDescriptor) -> Self {
        Self {
            model: FactoryModel::from_descriptor(&descriptor),
        }
    }

    /// Generates the complete factory implementation as a token stream.
    pub fn generate(self) -> TokenStream {
        let ident = &self.model.ident;
        let factory_struct = self.generate_struct();
        let constructor = self.generate_constructor();
        let factory_method = self.generate_factory_method();

        quote! {
            #factory_struct

            impl #ident {
                #constructor
            }

            #factory_method
        }
    }

    /// Generates the factory struct holding one provider per provided
    /// dependency.
    ///
    /// The `injectable` marker consumes the `#[qualified(...)]` field
    /// attributes after registering them with the framework.
    fn generate_struct(&self) -> TokenStream {
        let ident = &self.model.ident;
        let marker = match &self.model.marker {
            Some(marker) => quote! { #[#marker] },
            None => quote! {},
        };
        let fields = self.model.fields.iter().map(|field| {
            let name = &field.name;
            let ty = &field.ty;
            match &field.qualifier {
                Some(qualifier) => quote! { #[qualified(#qualifier)] #name: #ty },
                None => quote! { #name: #ty },
            }
        });

        quote! {
            #marker
            #[forgeron::injectable]
            #[allow(non_camel_case_types)]
            pub struct #ident {
                #(#fields,)*
            }
        }
    }

    /// Generates the framework-injectable constructor, one parameter per
    /// stored field in field order.
    fn generate_constructor(&self) -> TokenStream {
        let params = self.model.constructor_params().map(|(name, ty)| {
            quote! { #name: #ty }
        });
        let assignments = self.model.fields.iter().map(|field| &field.name);

        quote! {
            #[forgeron::inject]
            pub fn new(#(#params),*) -> Self {
                Self { #(#assignments),* }
            }
        }
    }

    /// Generates the factory method overriding the one declared on the
    /// factory interface.
    ///
    /// Parameters follow the declared assisted-key order; the construction
    /// arguments follow the dependency-request order. Assisted values and
    /// provider-typed dependencies pass through untouched, everything else
    /// is resolved from its stored provider.
    fn generate_factory_method(&self) -> TokenStream {
        let ident = &self.model.ident;
        let trait_path = &self.model.trait_path;
        let target = &self.model.target;
        let method = &self.model.method;
        let name = &method.name;
        let return_type = &method.return_type;
        let generics = match method.type_params.as_slice() {
            [] => quote! {},
            type_params => quote! { <#(#type_params),*> },
        };
        let params = method.params.iter().map(|(name, ty)| {
            quote! { #name: #ty }
        });
        let args = method.args.iter().map(|arg| match arg {
            Argument::Param(name) => quote! { #name },
            Argument::Field(name) => quote! { #name: self.#name.clone() },
            Argument::Resolved(name) => quote! { #name: self.#name.get() },
        });

        quote! {
            impl #trait_path for #ident {
                fn #name #generics (&self, #(#params),*) -> #return_type {
                    #target { #(#args),* }
                }
            }
        }
    }
}
