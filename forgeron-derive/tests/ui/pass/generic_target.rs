use forgeron::{AssistedFactory, Provider};

trait CrucibleFactory {
    fn create<T>(&self, seed: T) -> Crucible<T>;
}

#[derive(AssistedFactory)]
#[factory(implements = "CrucibleFactory")]
struct Crucible<T> {
    #[factory(assisted)]
    seed: T,
    heat: u32,
}

fn main() {
    let factory = Crucible_AssistedFactory::new(Provider::new(|| 1200));
    let crucible = factory.create("iron".to_owned());
    assert_eq!(crucible.seed, "iron");
    assert_eq!(crucible.heat, 1200);
}
