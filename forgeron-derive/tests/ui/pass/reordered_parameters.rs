use forgeron::{AssistedFactory, Provider};

trait HammerFactory {
    fn forge(&self, handle: String, head: u64) -> Hammer;
}

#[derive(AssistedFactory)]
#[factory(implements = "HammerFactory", method = "forge", params = "handle, head")]
struct Hammer {
    #[factory(assisted)]
    head: u64,
    weight: u64,
    #[factory(assisted)]
    handle: String,
}

fn main() {
    let factory = Hammer_AssistedFactory::new(Provider::new(|| 3));
    let hammer = factory.forge("oak".to_owned(), 9);
    assert_eq!(hammer.head, 9);
    assert_eq!(hammer.handle, "oak");
}
