use std::fmt;

/// Canal remoto de un objeto. Se elige a partir de `is_public` de la metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Remote {
    Public,
    Private,
}

impl Remote {
    pub fn for_visibility(is_public: bool) -> Self {
        if is_public {
            Remote::Public
        } else {
            Remote::Private
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Remote::Public => "public",
            Remote::Private => "private",
        }
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
