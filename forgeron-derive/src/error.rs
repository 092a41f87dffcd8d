/// Errors that can occur during factory derivation.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "the declared factory parameters do not match the assisted dependencies: expected {{{}}}, declared {{{}}}",
        .expected.join(", "),
        .actual.join(", ")
    )]
    AssistedKeySetMismatch {
        /// Assisted dependencies of the target, sorted display form.
        expected: Vec<String>,
        /// Declared factory parameters, sorted display form.
        actual: Vec<String>,
    },

    #[error("unknown factory parameter `{0}`: the target has no field with that name")]
    UnknownParameter(String),

    #[error("could not parse attribute: {0}")]
    UnparsableAttribute(#[from] darling::Error),

    #[error("AssistedFactory can only be derived from named structs, enum given")]
    UnsupportedDataStructureEnum,

    #[error("AssistedFactory can only be derived from named structs, tuple struct given")]
    UnsupportedDataStructureTupleStruct,

    #[error("AssistedFactory can only be derived from named structs, union given")]
    UnsupportedDataStructureUnion,

    #[error("AssistedFactory can only be derived from named structs, unit struct given")]
    UnsupportedDataStructureUnitStruct,
}

impl From<Error> for syn::Error {
    fn from(error: Error) -> Self {
        let span = match &error {
            Error::UnparsableAttribute(err) => err.span(),
            _ => proc_macro2::Span::call_site(),
        };

        syn::Error::new(span, error.to_string())
    }
}
