use quote::ToTokens;
use syn::{Generics, Ident, Path, Type};

use crate::error::Error;

/// Identifies a dependency lookup: a type plus an optional qualifier.
///
/// Two keys are equal iff both the type and the qualifier are equal. The
/// qualifier is opaque: it is attached, compared and rendered, never
/// interpreted.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Key {
    pub ty: Type,
    pub qualifier: Option<Path>,
}

impl Key {
    /// Creates an unqualified key.
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            qualifier: None,
        }
    }

    /// Creates a key carrying a qualifier annotation.
    pub fn qualified(ty: Type, qualifier: Path) -> Self {
        Self {
            ty,
            qualifier: Some(qualifier),
        }
    }

    /// Returns true if the key's type is already a lazy provider.
    ///
    /// A provider type is any path whose last segment is `Provider` with a
    /// single angle-bracketed type argument, so `forgeron::Provider<T>` and
    /// an imported `Provider<T>` both count.
    pub fn is_provider(&self) -> bool {
        let Type::Path(type_path) = &self.ty else {
            return false;
        };
        let Some(segment) = type_path.path.segments.last() else {
            return false;
        };
        if segment.ident != "Provider" {
            return false;
        }

        match &segment.arguments {
            syn::PathArguments::AngleBracketed(arguments) => {
                arguments.args.len() == 1
                    && matches!(arguments.args.first(), Some(syn::GenericArgument::Type(_)))
            }
            _ => false,
        }
    }
}

/// A key paired with the parameter name it travels under.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamedKey {
    pub name: Ident,
    pub key: Key,
}

impl NamedKey {
    /// Creates a named key.
    pub fn new(name: Ident, key: Key) -> Self {
        Self { name, key }
    }

    /// Canonical display form, used as the order-insensitive comparison key
    /// of the validation check and in its diagnostics. Generation order
    /// never consults it.
    pub fn display(&self) -> String {
        let ty = self.key.ty.to_token_stream();

        match &self.key.qualifier {
            Some(qualifier) => format!(
                "{}: #[qualified({})] {}",
                self.name,
                qualifier.to_token_stream(),
                ty
            ),
            None => format!("{}: {}", self.name, ty),
        }
    }
}

/// One constructor dependency of the target type.
///
/// The request list of a descriptor mirrors the target's field order; that
/// order fixes the argument order of the generated construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DependencyRequest {
    pub name: Ident,
    pub key: Key,
    pub is_assisted: bool,
}

impl DependencyRequest {
    /// Creates a caller-supplied dependency.
    pub fn assisted(name: Ident, key: Key) -> Self {
        Self {
            name,
            key,
            is_assisted: true,
        }
    }

    /// Creates a framework-resolved dependency.
    pub fn provided(name: Ident, key: Key) -> Self {
        Self {
            name,
            key,
            is_assisted: false,
        }
    }

    /// The named key this request contributes to the assisted set.
    pub fn named_key(&self) -> NamedKey {
        NamedKey::new(self.name.clone(), self.key.clone())
    }
}

/// A validated description of one factory to generate.
///
/// Construction goes through [`InjectionDescriptor::builder`], which fills
/// the defaulted fields and enforces the assisted-key invariant. Once built,
/// the descriptor is immutable.
#[derive(Clone, Debug)]
pub struct InjectionDescriptor {
    target_ident: Ident,
    target_generics: Generics,
    dependency_requests: Vec<DependencyRequest>,
    factory_type: Path,
    factory_method_name: Ident,
    return_type: Type,
    assisted_keys: Vec<NamedKey>,
    generated_marker: Option<Path>,
}

impl InjectionDescriptor {
    /// Starts a builder for the given target and factory interface.
    pub fn builder(
        target_ident: Ident,
        factory_type: Path,
        factory_method_name: Ident,
    ) -> DescriptorBuilder {
        DescriptorBuilder {
            target_ident,
            target_generics: Generics::default(),
            dependency_requests: Vec::new(),
            factory_type,
            factory_method_name,
            return_type: None,
            assisted_keys: None,
            generated_marker: None,
        }
    }

    pub fn target_ident(&self) -> &Ident {
        &self.target_ident
    }

    pub fn target_generics(&self) -> &Generics {
        &self.target_generics
    }

    /// All dependencies, in target field order.
    pub fn dependency_requests(&self) -> &[DependencyRequest] {
        &self.dependency_requests
    }

    pub fn factory_type(&self) -> &Path {
        &self.factory_type
    }

    pub fn factory_method_name(&self) -> &Ident {
        &self.factory_method_name
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// The factory method's parameters, in declared order.
    pub fn assisted_keys(&self) -> &[NamedKey] {
        &self.assisted_keys
    }

    pub fn generated_marker(&self) -> Option<&Path> {
        self.generated_marker.as_ref()
    }

    /// Framework-resolved dependencies, in request order.
    ///
    /// This order fixes both the generated field order and the constructor
    /// parameter order.
    pub fn provided_requests(&self) -> impl Iterator<Item = &DependencyRequest> {
        self.dependency_requests
            .iter()
            .filter(|request| !request.is_assisted)
    }

    /// Caller-supplied dependencies, in request order.
    pub fn assisted_requests(&self) -> impl Iterator<Item = &DependencyRequest> {
        self.dependency_requests
            .iter()
            .filter(|request| request.is_assisted)
    }
}

/// Builder computing the defaulted descriptor fields before the validating
/// construction.
pub struct DescriptorBuilder {
    target_ident: Ident,
    target_generics: Generics,
    dependency_requests: Vec<DependencyRequest>,
    factory_type: Path,
    factory_method_name: Ident,
    return_type: Option<Type>,
    assisted_keys: Option<Vec<NamedKey>>,
    generated_marker: Option<Path>,
}

impl DescriptorBuilder {
    /// Sets the target's generic parameters.
    pub fn target_generics(mut self, generics: Generics) -> Self {
        self.target_generics = generics;
        self
    }

    /// Appends one dependency request.
    pub fn dependency(mut self, request: DependencyRequest) -> Self {
        self.dependency_requests.push(request);
        self
    }

    /// Appends dependency requests, preserving their order.
    pub fn dependencies(mut self, requests: impl IntoIterator<Item = DependencyRequest>) -> Self {
        self.dependency_requests.extend(requests);
        self
    }

    /// Overrides the return type, which defaults to the target type.
    pub fn return_type(mut self, return_type: Type) -> Self {
        self.return_type = Some(return_type);
        self
    }

    /// Declares the factory method's parameter order, which defaults to the
    /// assisted requests in request order.
    pub fn assisted_keys(mut self, assisted_keys: Vec<NamedKey>) -> Self {
        self.assisted_keys = Some(assisted_keys);
        self
    }

    /// Sets an opaque marker annotation to stamp on the generated type.
    pub fn generated_marker(mut self, marker: Path) -> Self {
        self.generated_marker = Some(marker);
        self
    }

    /// Fills the defaulted fields and runs the validating construction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AssistedKeySetMismatch`] when the declared assisted
    /// keys are not, as a set, exactly the assisted subset of the
    /// dependency requests. Order differences between the two lists are
    /// legal: the declared list fixes the factory method signature, the
    /// request list fixes the construction argument order.
    pub fn build(self) -> Result<InjectionDescriptor, Error> {
        let return_type = self
            .return_type
            .unwrap_or_else(|| default_return_type(&self.target_ident, &self.target_generics));

        let expected: Vec<NamedKey> = self
            .dependency_requests
            .iter()
            .filter(|request| request.is_assisted)
            .map(DependencyRequest::named_key)
            .collect();
        let assisted_keys = self.assisted_keys.unwrap_or_else(|| expected.clone());

        let mut expected_set: Vec<String> = expected.iter().map(NamedKey::display).collect();
        let mut actual_set: Vec<String> = assisted_keys.iter().map(NamedKey::display).collect();
        expected_set.sort();
        actual_set.sort();

        if expected_set != actual_set {
            return Err(Error::AssistedKeySetMismatch {
                expected: expected_set,
                actual: actual_set,
            });
        }

        Ok(InjectionDescriptor {
            target_ident: self.target_ident,
            target_generics: self.target_generics,
            dependency_requests: self.dependency_requests,
            factory_type: self.factory_type,
            factory_method_name: self.factory_method_name,
            return_type,
            assisted_keys,
            generated_marker: self.generated_marker,
        })
    }
}

fn default_return_type(target_ident: &Ident, target_generics: &Generics) -> Type {
    let (_, ty_generics, _) = target_generics.split_for_impl();

    syn::parse_quote!(#target_ident #ty_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::format_ident;
    use syn::parse_quote;

    fn request(name: &str, ty: Type, is_assisted: bool) -> DependencyRequest {
        DependencyRequest {
            name: format_ident!("{}", name),
            key: Key::new(ty),
            is_assisted,
        }
    }

    fn named_key(name: &str, ty: Type) -> NamedKey {
        NamedKey::new(format_ident!("{}", name), Key::new(ty))
    }

    fn builder() -> DescriptorBuilder {
        InjectionDescriptor::builder(
            format_ident!("Anvil"),
            parse_quote!(ForgeFactory),
            format_ident!("create"),
        )
    }

    #[test]
    fn test_assisted_keys_default_to_the_assisted_subset_in_request_order() {
        // Arrange the descriptor with an interleaved request list
        let descriptor = builder()
            .dependency(request("engraving", parse_quote!(String), true))
            .dependency(request("weight", parse_quote!(u64), false))
            .dependency(request("rune", parse_quote!(Rune), true))
            .build();

        // Assert the defaulted assisted keys
        let descriptor = descriptor.unwrap();
        assert_eq!(
            descriptor.assisted_keys(),
            [
                named_key("engraving", parse_quote!(String)),
                named_key("rune", parse_quote!(Rune)),
            ]
        );
    }

    #[test]
    fn test_return_type_defaults_to_the_target_type() {
        // Arrange a descriptor with no return type override
        let descriptor = builder().build().unwrap();

        // Assert the defaulted return type
        assert_eq!(descriptor.return_type(), &parse_quote!(Anvil));
    }

    #[test]
    fn test_return_type_default_carries_the_target_generics() {
        // Arrange a descriptor for a parameterized target
        let descriptor = InjectionDescriptor::builder(
            format_ident!("Crucible"),
            parse_quote!(CrucibleFactory),
            format_ident!("create"),
        )
        .target_generics(parse_quote!(<T>))
        .dependency(request("seed", parse_quote!(T), true))
        .build()
        .unwrap();

        // Assert the defaulted return type
        assert_eq!(descriptor.return_type(), &parse_quote!(Crucible<T>));
    }

    #[test]
    fn test_declared_keys_may_reorder_the_assisted_subset() {
        // Arrange declared keys reversed relative to the request order
        let result = builder()
            .dependency(request("engraving", parse_quote!(String), true))
            .dependency(request("rune", parse_quote!(Rune), true))
            .dependency(request("weight", parse_quote!(u64), false))
            .assisted_keys(vec![
                named_key("rune", parse_quote!(Rune)),
                named_key("engraving", parse_quote!(String)),
            ])
            .build();

        // Assert construction succeeds and the declared order survives
        let descriptor = result.unwrap();
        assert_eq!(
            descriptor.assisted_keys(),
            [
                named_key("rune", parse_quote!(Rune)),
                named_key("engraving", parse_quote!(String)),
            ]
        );
        // The request order is untouched by the declared order
        assert_eq!(
            descriptor
                .dependency_requests()
                .iter()
                .map(|request| request.name.to_string())
                .collect::<Vec<_>>(),
            ["engraving", "rune", "weight"]
        );
    }

    #[test]
    fn test_a_missing_assisted_key_fails_construction() {
        // Arrange declared keys missing one assisted request
        let result = builder()
            .dependency(request("engraving", parse_quote!(String), true))
            .dependency(request("rune", parse_quote!(Rune), true))
            .assisted_keys(vec![named_key("engraving", parse_quote!(String))])
            .build();

        // Assert the mismatch names the missing entry
        assert!(matches!(
            result.unwrap_err(),
            Error::AssistedKeySetMismatch { expected, actual }
                if expected.iter().any(|key| key.starts_with("rune:"))
                    && !actual.iter().any(|key| key.starts_with("rune:"))
        ));
    }

    #[test]
    fn test_a_declared_key_for_a_provided_dependency_fails_construction() {
        // Arrange declared keys naming a provided request
        let result = builder()
            .dependency(request("engraving", parse_quote!(String), true))
            .dependency(request("weight", parse_quote!(u64), false))
            .assisted_keys(vec![
                named_key("engraving", parse_quote!(String)),
                named_key("weight", parse_quote!(u64)),
            ])
            .build();

        // Assert the result
        assert!(matches!(
            result,
            Err(Error::AssistedKeySetMismatch { .. })
        ));
    }

    #[test]
    fn test_keys_with_different_qualifiers_are_not_interchangeable() {
        // Arrange a declared key dropping the request's qualifier
        let result = builder()
            .dependency(DependencyRequest::assisted(
                format_ident!("engraving"),
                Key::qualified(parse_quote!(String), parse_quote!(runic)),
            ))
            .assisted_keys(vec![named_key("engraving", parse_quote!(String))])
            .build();

        // Assert the result
        assert!(matches!(
            result,
            Err(Error::AssistedKeySetMismatch { .. })
        ));
    }

    #[test]
    fn test_an_empty_descriptor_builds() {
        // Arrange a descriptor with no dependencies at all
        let result = builder().build();

        // Assert the result
        let descriptor = result.unwrap();
        assert!(descriptor.assisted_keys().is_empty());
        assert_eq!(descriptor.provided_requests().count(), 0);
    }

    #[test]
    fn test_the_partition_preserves_relative_order() {
        // Arrange an interleaved request list
        let descriptor = builder()
            .dependency(request("bellows", parse_quote!(Bellows), false))
            .dependency(request("engraving", parse_quote!(String), true))
            .dependency(request("weight", parse_quote!(u64), false))
            .build()
            .unwrap();

        // Assert each partition keeps the request order
        assert_eq!(
            descriptor
                .provided_requests()
                .map(|request| request.name.to_string())
                .collect::<Vec<_>>(),
            ["bellows", "weight"]
        );
        assert_eq!(
            descriptor
                .assisted_requests()
                .map(|request| request.name.to_string())
                .collect::<Vec<_>>(),
            ["engraving"]
        );
    }

    #[test]
    fn test_provider_detection_accepts_qualified_paths() {
        // Arrange keys in the shapes generation will meet
        let plain = Key::new(parse_quote!(Provider<Spark>));
        let qualified = Key::new(parse_quote!(forgeron::Provider<Spark>));
        let unrelated = Key::new(parse_quote!(Vec<Spark>));
        let bare = Key::new(parse_quote!(Provider));

        // Assert the provider shapes
        assert!(plain.is_provider());
        assert!(qualified.is_provider());
        assert!(!unrelated.is_provider());
        assert!(!bare.is_provider());
    }
}
