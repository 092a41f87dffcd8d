use forgeron::{AssistedFactory, Provider};

trait ForgeFactory {
    fn create(&self, name: String) -> Forge;
}

#[derive(AssistedFactory)]
#[factory(implements = "ForgeFactory")]
struct Forge {
    #[factory(assisted)]
    name: String,
    igniter: Provider<u32>,
}

fn main() {
    let factory = Forge_AssistedFactory::new(Provider::new(|| 451));
    let forge = factory.create("smithy".to_owned());
    assert_eq!(forge.igniter.get(), 451);
}
