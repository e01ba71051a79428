/// Which entities a control command applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target<'a> {
    /// Every registered entity (`"*"` on the wire).
    All,
    /// One entity by name.
    Named(&'a str),
}

impl<'a> Target<'a> {
    /// Parse a wire name; `"*"` selects all entities.
    pub fn parse(name: &'a str) -> Self {
        if name == "*" {
            Self::All
        } else {
            Self::Named(name)
        }
    }
}

impl std::fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("*"),
            Self::Named(name) => f.write_str(name),
        }
    }
}
