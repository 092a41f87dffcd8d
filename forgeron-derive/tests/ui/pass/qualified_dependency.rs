use forgeron::{AssistedFactory, Provider};

trait ForgeFactory {
    fn create(&self, engraving: String) -> Anvil;
}

#[derive(AssistedFactory)]
#[factory(implements = "ForgeFactory")]
struct Anvil {
    #[factory(assisted)]
    engraving: String,
    #[factory(qualifier = "tempered")]
    weight: u64,
}

fn main() {
    let factory = Anvil_AssistedFactory::new(Provider::new(|| 12));
    let anvil = factory.create("rune".to_owned());
    assert_eq!(anvil.weight, 12);
}
