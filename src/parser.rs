//! Splitting a command line into a command name and its arguments.

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandInvocation {
    /// First whitespace-delimited token, taken verbatim. Empty for blank lines.
    pub name: String,
    /// Remaining tokens with double quotes and escapes removed.
    pub args: Vec<String>,
    /// False when the line ended inside a quoted argument.
    pub quotes_balanced: bool,
}

impl CommandInvocation {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexingState {
    Start,
    ReadingWord,
    ReadingQuoted,
    ReadingEscape,
}

struct LexingFSM {
    input: Vec<char>,
    pos: usize,
    state: LexingState,
    buffer: String,
}

impl LexingFSM {
    fn new(line: &str) -> Self {
        LexingFSM {
            input: line.chars().collect(),
            pos: 0,
            state: LexingState::Start,
            buffer: String::new(),
        }
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.input.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// The command name ends at the first whitespace; quotes in it are literal.
    fn read_name(&mut self) -> String {
        while self.input.get(self.pos).is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
        let mut name = String::new();
        while let Some(ch) = self.input.get(self.pos).copied() {
            if ch.is_whitespace() {
                break;
            }
            name.push(ch);
            self.pos += 1;
        }
        name
    }

    fn read_args(&mut self) -> (Vec<String>, bool) {
        let mut out = Vec::new();

        while let Some(ch) = self.read_char() {
            match self.state {
                LexingState::Start => self.handle_start(ch),
                LexingState::ReadingWord => self.handle_word(ch, &mut out),
                LexingState::ReadingQuoted => self.handle_quoted(ch, &mut out),
                LexingState::ReadingEscape => {
                    self.buffer.push(ch);
                    self.state = LexingState::ReadingQuoted;
                }
            }
        }

        let balanced = match self.state {
            LexingState::Start => true,
            LexingState::ReadingWord => {
                out.push(std::mem::take(&mut self.buffer));
                true
            }
            LexingState::ReadingQuoted | LexingState::ReadingEscape => {
                out.push(std::mem::take(&mut self.buffer));
                false
            }
        };

        (out, balanced)
    }

    fn handle_start(&mut self, ch: char) {
        match ch {
            c if c.is_whitespace() => {}
            '"' => self.state = LexingState::ReadingQuoted,
            c => {
                self.buffer.push(c);
                self.state = LexingState::ReadingWord;
            }
        }
    }

    fn handle_word(&mut self, ch: char, out: &mut Vec<String>) {
        if ch.is_whitespace() {
            out.push(std::mem::take(&mut self.buffer));
            self.state = LexingState::Start;
        } else {
            self.buffer.push(ch);
        }
    }

    fn handle_quoted(&mut self, ch: char, out: &mut Vec<String>) {
        match ch {
            '\\' => self.state = LexingState::ReadingEscape,
            '"' => {
                out.push(std::mem::take(&mut self.buffer));
                self.state = LexingState::Start;
            }
            c => self.buffer.push(c),
        }
    }
}

/// Tokenize one logical command line.
///
/// A quoted argument (`"a b"`) is a single argument with `\"` and `\\`
/// unescaped. An unterminated quote still yields its text as the last
/// argument, with [`CommandInvocation::quotes_balanced`] cleared so the
/// handler can report a syntax error.
pub fn tokenize(line: &str) -> CommandInvocation {
    let mut lexer = LexingFSM::new(line);
    let name = lexer.read_name();
    if name.is_empty() {
        return CommandInvocation {
            quotes_balanced: true,
            ..Default::default()
        };
    }
    let (args, quotes_balanced) = lexer.read_args();
    CommandInvocation {
        name,
        args,
        quotes_balanced,
    }
}

/// Whether a physical line asks to be continued on the next one.
///
/// The final backslash counts only when it is not itself escaped.
pub fn needs_continuation(line: &str) -> bool {
    let trailing = line.chars().rev().take_while(|&c| c == '\\').count();
    trailing % 2 == 1
}

/// Join a continued line with the next physical line, turning the trailing
/// backslash into a newline.
pub fn join_continuation(line: &mut String, next: &str) {
    if needs_continuation(line) {
        line.pop();
        line.push('\n');
    }
    line.push_str(next);
}
