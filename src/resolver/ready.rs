pub enum Ready<V> {
    Ready(V),
    NotReady,
}

impl<V> Ready<V> {
    pub const fn as_option(&self) -> Option<&V> {
        match self {
            Self::Ready(val) => Some(val),
            Self::NotReady => None,
        }
    }
}
