//! The fixed table of builtin commands.

/// Every command the shell understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Cat,
    Cd,
    Exit,
    Grep,
    Help,
    Ls,
    Mail,
}

impl Builtin {
    /// Commands available in every session, in help order.
    pub const CORE: [Builtin; 6] = [
        Builtin::Cat,
        Builtin::Cd,
        Builtin::Exit,
        Builtin::Grep,
        Builtin::Help,
        Builtin::Ls,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Cat => "cat",
            Builtin::Cd => "cd",
            Builtin::Exit => "exit",
            Builtin::Grep => "grep",
            Builtin::Help => "help",
            Builtin::Ls => "ls",
            Builtin::Mail => "mail",
        }
    }

    /// Usage string printed on a syntax error.
    pub fn usage(self) -> &'static str {
        match self {
            Builtin::Cat => "cat <file>",
            Builtin::Cd => "cd <directory>",
            Builtin::Exit => "exit",
            Builtin::Grep => "grep [-r] <pattern> <file...>",
            Builtin::Help => "help",
            Builtin::Ls => "ls or ls <directory>",
            Builtin::Mail => "mail <file> <address>",
        }
    }

    /// Rows of the help table: (usage column, description).
    pub fn help_rows(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Builtin::Cat => &[("cat <file>", "Shows the content of a <file> as text.")],
            Builtin::Cd => &[(
                "cd <directory>",
                "Changes the working directory to <directory>.",
            )],
            Builtin::Exit => &[("exit", "Leaves the current shell program.")],
            Builtin::Grep => &[
                (
                    "grep [-r] <pattern> <file/directory...>",
                    "Shows the lines in a given <file> that match a given <pattern>.",
                ),
                (
                    "",
                    "-r: All files from a given <directory> and its subdirectories are considered.",
                ),
            ],
            Builtin::Help => &[("help", "Shows this information text.")],
            Builtin::Ls => &[
                ("ls", "Lists the contents of the working directory."),
                ("ls <directory>", "Lists the contents of the given <directory>."),
            ],
            Builtin::Mail => &[(
                "mail <file> <address>",
                "Queues a <file> to be mailed to <address>.",
            )],
        }
    }
}

/// Name lookup over the builtins enabled for a session.
#[derive(Debug, Clone)]
pub struct Registry {
    commands: Vec<Builtin>,
}

impl Registry {
    /// The six core commands.
    pub fn core() -> Self {
        Self {
            commands: Builtin::CORE.to_vec(),
        }
    }

    /// The core commands plus `mail`.
    pub fn with_mail() -> Self {
        let mut registry = Self::core();
        registry.commands.push(Builtin::Mail);
        registry
    }

    /// Exact, case-sensitive lookup.
    pub fn lookup(&self, name: &str) -> Option<Builtin> {
        self.commands.iter().copied().find(|cmd| cmd.name() == name)
    }

    pub fn commands(&self) -> &[Builtin] {
        &self.commands
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::core()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_exact() {
        let registry = Registry::core();
        assert_eq!(registry.lookup("grep"), Some(Builtin::Grep));
        assert_eq!(registry.lookup("Grep"), None);
        assert_eq!(registry.lookup("gre"), None);
        assert_eq!(registry.lookup(""), None);
    }

    #[test]
    fn test_mail_only_when_enabled() {
        assert_eq!(Registry::core().lookup("mail"), None);
        assert_eq!(Registry::with_mail().lookup("mail"), Some(Builtin::Mail));
    }

    #[test]
    fn test_every_core_command_is_registered_by_name() {
        let registry = Registry::default();
        for cmd in Builtin::CORE {
            assert_eq!(registry.lookup(cmd.name()), Some(cmd));
        }
    }
}
