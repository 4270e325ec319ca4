/// One compiled element of a wildcard pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Token {
  /// `*`: any run of characters, including none.
  AnySequence,
  /// `?`: exactly one character.
  AnyChar,
  Literal(char),
}

/// A wildcard pattern and its case sensitivity, compiled once and matched
/// against whole messages.
///
/// `*` matches any sequence, `?` matches one character, and `\` makes the
/// next character literal. The pattern must cover the entire message, so a
/// substring search is written `*needle*`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WildcardQuery {
  pattern: String,
  case_sensitive: bool,
  tokens: Vec<Token>,
}

impl WildcardQuery {
  /// Compile a case-insensitive pattern.
  pub fn new(pattern: impl Into<String>) -> Self {
    Self::with_case_sensitivity(pattern, false)
  }

  pub fn case_sensitive(pattern: impl Into<String>) -> Self {
    Self::with_case_sensitivity(pattern, true)
  }

  pub fn with_case_sensitivity(pattern: impl Into<String>, case_sensitive: bool) -> Self {
    let pattern = pattern.into();
    let tokens = compile(&pattern, case_sensitive);
    Self {
      pattern,
      case_sensitive,
      tokens,
    }
  }

  pub fn pattern(&self) -> &str {
    &self.pattern
  }

  pub fn is_case_sensitive(&self) -> bool {
    self.case_sensitive
  }

  /// Whether the pattern matches all of `text`.
  pub fn matches(&self, text: &str) -> bool {
    let text: Vec<char> = text.chars().map(|c| fold(c, self.case_sensitive)).collect();
    match_tokens(&self.tokens, &text)
  }
}

/// Match `text` against a wildcard `pattern` without keeping the compiled
/// form around.
pub fn wildcard_match(text: &str, pattern: &str, case_sensitive: bool) -> bool {
  WildcardQuery::with_case_sensitivity(pattern, case_sensitive).matches(text)
}

fn fold(c: char, case_sensitive: bool) -> char {
  if case_sensitive {
    c
  } else {
    c.to_lowercase().next().unwrap_or(c)
  }
}

fn compile(pattern: &str, case_sensitive: bool) -> Vec<Token> {
  let mut tokens = Vec::with_capacity(pattern.len());
  let mut chars = pattern.chars();
  while let Some(c) = chars.next() {
    let token = match c {
      // Consecutive stars are equivalent to one.
      '*' if tokens.last() == Some(&Token::AnySequence) => continue,
      '*' => Token::AnySequence,
      '?' => Token::AnyChar,
      // A trailing backslash stands for itself.
      '\\' => Token::Literal(fold(chars.next().unwrap_or('\\'), case_sensitive)),
      other => Token::Literal(fold(other, case_sensitive)),
    };
    tokens.push(token);
  }
  tokens
}

/// Greedy matcher that backtracks to the most recent `*` on mismatch.
fn match_tokens(tokens: &[Token], text: &[char]) -> bool {
  let mut t = 0;
  let mut p = 0;
  // (token index of the last `*`, text index it currently resumes from)
  let mut backtrack: Option<(usize, usize)> = None;

  while t < text.len() {
    match tokens.get(p) {
      Some(Token::AnySequence) => {
        backtrack = Some((p, t));
        p += 1;
        continue;
      }
      Some(Token::AnyChar) => {
        t += 1;
        p += 1;
        continue;
      }
      Some(Token::Literal(c)) if *c == text[t] => {
        t += 1;
        p += 1;
        continue;
      }
      _ => {}
    }

    match backtrack {
      Some((star, resume)) => {
        p = star + 1;
        t = resume + 1;
        backtrack = Some((star, resume + 1));
      }
      None => return false,
    }
  }

  tokens[p..].iter().all(|t| *t == Token::AnySequence)
}
