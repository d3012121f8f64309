use crate::models::Value;

/// One field of a data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Missing,
}

impl Token {
    pub fn text(text: impl Into<String>) -> Self {
        Token::Text(text.into())
    }

    pub fn into_value(self) -> Value {
        match self {
            Token::Text(text) => Value::Raw(text),
            Token::Missing => Value::Missing,
        }
    }
}

/// Tokens of one row, plus the lengths of any asterisk runs that could not be
/// mapped to a field count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedRow {
    pub tokens: Vec<Token>,
    pub ambiguous_runs: Vec<usize>,
}

impl TokenizedRow {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.tokens.into_iter().map(Token::into_value).collect()
    }
}

/// Number of fields a run of asterisks stands for.
///
/// Fields are 6 to 8 characters wide, so runs of 6-8, 12-16 and 18-23
/// asterisks are one, two and three fields. Any other length is ambiguous and
/// counts as one field.
pub fn missing_field_count(run_length: usize) -> (usize, bool) {
    match run_length {
        6..=8 => (1, false),
        12..=16 => (2, false),
        18..=23 => (3, false),
        _ => (1, true),
    }
}

/// Split a fixed-width data row into tokens.
///
/// Handles the two ways the profiler glues fields together: a negative value
/// whose sign touches the previous field (`20.2-125.3`), and asterisk runs
/// printed in place of one or more values (`293.8*******    0.`). A `-`
/// directly after `E` is an exponent sign and stays in its token.
pub fn tokenize(line: &str) -> TokenizedRow {
    let mut row = TokenizedRow::default();
    let mut current = String::new();
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                flush(&mut current, &mut row.tokens);
                let mut run_length = 1;
                while chars.peek() == Some(&'*') {
                    chars.next();
                    run_length += 1;
                }
                let (count, ambiguous) = missing_field_count(run_length);
                if ambiguous {
                    row.ambiguous_runs.push(run_length);
                }
                row.tokens
                    .extend(std::iter::repeat(Token::Missing).take(count));
            }
            '-' if !current.is_empty() && !current.ends_with('E') => {
                flush(&mut current, &mut row.tokens);
                current.push(c);
            }
            c if c.is_whitespace() => flush(&mut current, &mut row.tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut row.tokens);

    row
}

fn flush(current: &mut String, tokens: &mut Vec<Token>) {
    if !current.is_empty() {
        tokens.push(Token::Text(std::mem::take(current)));
    }
}
