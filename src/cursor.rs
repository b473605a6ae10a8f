//! A resumable, one-character-at-a-time parsing engine.
//!
//! Grammars built on this module are written as a set of named states. Each
//! state looks at exactly one character and answers with a [`Flow`]: either
//! the character was handled and the engine may move on, or the (possibly
//! new) active state must look at the same character again.
//!
//! Recursive descent is emulated with an explicit stack of [`Frame`]s rather
//! than the native call stack. A state may `call` a sub-production, which
//! pushes a fresh frame, and the sub-production later `ret`urns a value into
//! its parent's frame. Because all of the parser's progress lives in that
//! stack, input can be delivered in arbitrary chunks: [`Driver::feed`] simply
//! stops when a chunk runs out and picks up where it left off on the next
//! call.
//!
//! End of input is delivered as `None` in place of a character, so every
//! state handles it as an ordinary transition.

use std::fmt;
use std::mem;

use tracing::debug;

use crate::error::{ErrorKind, ParseError};

/// What the engine does after a state has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Flow {
    /// The character was handled; deliver the next one.
    Next,
    /// Run the active state again on the same character.
    Again,
}

/// One level of the emulated call stack.
#[derive(Debug)]
pub struct Frame<S, V> {
    /// Where this frame resumes on the next character.
    pub state: S,
    /// Raw characters collected for the token under construction.
    pub buf: String,
    /// The value handed back by the most recently returned child frame.
    pub returned: Option<V>,
    /// The partial result this frame is assembling.
    pub result: Option<V>,
}

impl<S, V> Frame<S, V> {
    fn new(state: S) -> Self {
        Frame {
            state,
            buf: String::new(),
            returned: None,
            result: None,
        }
    }
}

/// The position and call stack handed to every grammar state.
pub struct Cursor<S, V> {
    ch: Option<char>,
    line: usize,
    col: usize,
    pos: usize,
    read: usize,
    after_newline: bool,
    top: Frame<S, V>,
    parents: Vec<Frame<S, V>>,
}

impl<S, V> Cursor<S, V>
where
    S: Copy + PartialEq,
    V: From<String>,
{
    pub fn new(start: S) -> Self {
        Cursor {
            ch: None,
            line: 1,
            col: 0,
            pos: 0,
            read: 0,
            after_newline: false,
            top: Frame::new(start),
            parents: Vec::new(),
        }
    }

    /// The character under the cursor, or `None` at end of input.
    #[inline]
    #[must_use]
    pub fn ch(&self) -> Option<char> {
        self.ch
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> S {
        self.top.state
    }

    /// Number of frames above the root.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    #[inline]
    #[must_use]
    pub fn col(&self) -> usize {
        self.col
    }

    #[inline]
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    fn advance(&mut self, ch: Option<char>) {
        self.ch = ch;
        match ch {
            Some(c) => {
                if self.after_newline {
                    self.line += 1;
                    self.col = 0;
                }
                self.col += 1;
                self.pos = self.read;
                self.read += 1;
                self.after_newline = c == '\n';
            }
            None => self.pos = self.read,
        }
    }

    /// Resumes the active frame in `state` on the next character.
    pub fn next(&mut self, state: S) -> Flow {
        self.top.state = state;
        Flow::Next
    }

    /// Switches the active frame to `state` and runs it on the current character.
    pub fn goto(&mut self, state: S) -> Flow {
        self.top.state = state;
        Flow::Again
    }

    /// Pushes a frame running `state`, starting with the next character.
    ///
    /// When `return_to` is given the calling frame resumes there once the
    /// child returns; otherwise it resumes in its current state.
    pub fn call(&mut self, state: S, return_to: Option<S>) -> Flow {
        self.push(state, return_to);
        Flow::Next
    }

    /// Like [`Cursor::call`], but the new frame sees the current character.
    pub fn call_now(&mut self, state: S, return_to: Option<S>) -> Flow {
        self.push(state, return_to);
        Flow::Again
    }

    /// Pops the active frame and hands `value` to its parent, which resumes
    /// on the next character. Without a value the frame's buffer is returned.
    pub fn ret(&mut self, value: Option<V>) -> Flow {
        self.pop(value);
        Flow::Next
    }

    /// Like [`Cursor::ret`], but the parent sees the current character.
    pub fn ret_now(&mut self, value: Option<V>) -> Flow {
        self.pop(value);
        Flow::Again
    }

    fn push(&mut self, state: S, return_to: Option<S>) {
        if let Some(resume) = return_to {
            self.top.state = resume;
        }
        let parent = mem::replace(&mut self.top, Frame::new(state));
        self.parents.push(parent);
    }

    fn pop(&mut self, value: Option<V>) {
        match self.parents.pop() {
            Some(parent) => {
                let mut child = mem::replace(&mut self.top, parent);
                let value = value.unwrap_or_else(|| V::from(mem::take(&mut child.buf)));
                self.top.returned = Some(value);
            }
            // the root has nowhere to return to; keep the value on it
            None => {
                let value = value.unwrap_or_else(|| V::from(mem::take(&mut self.top.buf)));
                self.top.returned = Some(value);
            }
        }
    }

    /// Appends the current character to the active frame's buffer.
    pub fn consume(&mut self) -> Result<(), ErrorKind> {
        match self.ch {
            Some(c) => {
                self.top.buf.push(c);
                Ok(())
            }
            None => Err(ErrorKind::PrematureEndOfInput),
        }
    }

    #[inline]
    #[must_use]
    pub fn buf(&self) -> &str {
        &self.top.buf
    }

    #[inline]
    pub fn buf_mut(&mut self) -> &mut String {
        &mut self.top.buf
    }

    pub fn take_buf(&mut self) -> String {
        mem::take(&mut self.top.buf)
    }

    /// Takes the value returned by the last child frame.
    pub fn take_returned(&mut self) -> Option<V> {
        self.top.returned.take()
    }

    #[must_use]
    pub fn returned(&self) -> Option<&V> {
        self.top.returned.as_ref()
    }

    #[must_use]
    pub fn result(&self) -> Option<&V> {
        self.top.result.as_ref()
    }

    pub fn result_mut(&mut self) -> &mut Option<V> {
        &mut self.top.result
    }

    pub fn take_result(&mut self) -> Option<V> {
        self.top.result.take()
    }
}

impl<S: fmt::Debug, V> fmt::Debug for Cursor<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("ch", &self.ch)
            .field("line", &self.line)
            .field("col", &self.col)
            .field("pos", &self.pos)
            .field("state", &self.top.state)
            .field("depth", &self.parents.len())
            .finish()
    }
}

/// A set of states driven by a [`Driver`].
pub trait Grammar {
    type State: Copy + PartialEq + fmt::Debug;
    type Value: From<String>;

    /// The state of the root frame.
    fn start(&self) -> Self::State;

    /// Runs the active state on the character under the cursor.
    fn step(&mut self, cursor: &mut Cursor<Self::State, Self::Value>) -> Result<Flow, ErrorKind>;
}

/// Feeds characters to a [`Grammar`] and tracks failures.
///
/// Once a step fails the driver is poisoned: every later call reports the
/// same error.
pub struct Driver<G: Grammar> {
    grammar: G,
    cursor: Cursor<G::State, G::Value>,
    error: Option<ParseError>,
}

impl<G: Grammar> Driver<G> {
    pub fn new(grammar: G) -> Self {
        let cursor = Cursor::new(grammar.start());
        Driver {
            grammar,
            cursor,
            error: None,
        }
    }

    /// Delivers every character of `chunk` to the grammar.
    ///
    /// # Errors
    ///
    /// Returns the first grammar violation, positioned at the failing character.
    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        self.check()?;
        for ch in chunk.chars() {
            self.cursor.advance(Some(ch));
            self.run()?;
        }
        Ok(())
    }

    /// Delivers end of input until the grammar settles.
    ///
    /// The active state is re-run on end of input for as long as each run
    /// changes the active state or the stack depth. Frames still open
    /// afterwards mean the input stopped in the middle of a production.
    ///
    /// # Errors
    ///
    /// Returns the grammar's end-of-input error, or
    /// [`ErrorKind::PrematureEndOfInput`] if the stack did not unwind.
    pub fn finish(&mut self) -> Result<(), ParseError> {
        self.check()?;
        self.cursor.advance(None);
        loop {
            let before = (self.cursor.state(), self.cursor.depth());
            self.run()?;
            if (self.cursor.state(), self.cursor.depth()) == before {
                break;
            }
        }
        if self.cursor.depth() > 0 {
            return Err(self.fail(ErrorKind::PrematureEndOfInput));
        }
        Ok(())
    }

    #[must_use]
    pub fn grammar(&self) -> &G {
        &self.grammar
    }

    pub fn into_grammar(self) -> G {
        self.grammar
    }

    fn check(&self) -> Result<(), ParseError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            match self.grammar.step(&mut self.cursor) {
                Ok(Flow::Next) => return Ok(()),
                Ok(Flow::Again) => continue,
                Err(kind) => return Err(self.fail(kind)),
            }
        }
    }

    fn fail(&mut self, kind: ErrorKind) -> ParseError {
        let err = ParseError::new(kind, self.cursor.line, self.cursor.col, self.cursor.pos);
        debug!(
            line = err.line,
            col = err.col,
            state = ?self.cursor.state(),
            depth = self.cursor.depth(),
            "parse aborted: {}",
            err.kind
        );
        self.error = Some(err.clone());
        err
    }
}

impl<G: Grammar + fmt::Debug> fmt::Debug for Driver<G>
where
    G::State: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("grammar", &self.grammar)
            .field("cursor", &self.cursor)
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parenthesised word lists: `(ab (cd) e)`.
    #[derive(Debug, Clone, PartialEq)]
    enum Sexp {
        Word(String),
        List(Vec<Sexp>),
    }

    impl From<String> for Sexp {
        fn from(word: String) -> Self {
            Sexp::Word(word)
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum State {
        Start,
        Done,
        List,
        RecordItem,
        Word,
    }

    #[derive(Debug, Default)]
    struct Lists {
        output: Option<Sexp>,
    }

    impl Grammar for Lists {
        type State = State;
        type Value = Sexp;

        fn start(&self) -> State {
            State::Start
        }

        fn step(&mut self, c: &mut Cursor<State, Sexp>) -> Result<Flow, ErrorKind> {
            match c.state() {
                State::Start => match c.ch() {
                    Some(' ') | Some('\n') => Ok(Flow::Next),
                    Some('(') => Ok(c.call(State::List, Some(State::Done))),
                    None => Ok(Flow::Next),
                    found => Err(ErrorKind::unexpected(found, "`(`")),
                },
                State::Done => {
                    if let Some(value) = c.take_returned() {
                        self.output = Some(value);
                    }
                    match c.ch() {
                        Some(' ') | Some('\n') | None => Ok(Flow::Next),
                        found => Err(ErrorKind::unexpected(found, "end of input")),
                    }
                }
                State::List => match c.ch() {
                    Some(' ') | Some('\n') => Ok(Flow::Next),
                    Some(')') => {
                        let items = match c.take_result() {
                            Some(list) => list,
                            None => Sexp::List(Vec::new()),
                        };
                        Ok(c.ret(Some(items)))
                    }
                    Some('(') => Ok(c.call(State::List, Some(State::RecordItem))),
                    Some(ch) if ch.is_ascii_alphabetic() => {
                        Ok(c.call_now(State::Word, Some(State::RecordItem)))
                    }
                    None => Err(ErrorKind::PrematureEndOfInput),
                    found => Err(ErrorKind::unexpected(found, "a word or list")),
                },
                State::RecordItem => {
                    let item = c
                        .take_returned()
                        .ok_or(ErrorKind::unexpected(c.ch(), "an item"))?;
                    match c.result_mut() {
                        Some(Sexp::List(items)) => items.push(item),
                        slot => *slot = Some(Sexp::List(vec![item])),
                    }
                    Ok(c.goto(State::List))
                }
                State::Word => match c.ch() {
                    Some(ch) if ch.is_ascii_alphabetic() => {
                        c.consume()?;
                        Ok(Flow::Next)
                    }
                    _ => Ok(c.ret_now(None)),
                },
            }
        }
    }

    fn parse_all(input: &str) -> Result<Option<Sexp>, ParseError> {
        let mut driver = Driver::new(Lists::default());
        driver.feed(input)?;
        driver.finish()?;
        Ok(driver.into_grammar().output)
    }

    fn word(w: &str) -> Sexp {
        Sexp::Word(w.to_string())
    }

    #[test]
    fn test_nested_calls_unwind() {
        let parsed = parse_all("(ab (cd) e)").unwrap();
        assert_eq!(
            parsed,
            Some(Sexp::List(vec![
                word("ab"),
                Sexp::List(vec![word("cd")]),
                word("e"),
            ]))
        );
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(parse_all("()").unwrap(), Some(Sexp::List(Vec::new())));
    }

    #[test]
    fn test_chunked_feed_matches_whole_input() {
        let input = "(alpha (beta gamma) (delta (epsilon)))";
        let whole = parse_all(input).unwrap();

        for split in 0..=input.len() {
            let mut driver = Driver::new(Lists::default());
            driver.feed(&input[..split]).unwrap();
            driver.feed(&input[split..]).unwrap();
            driver.finish().unwrap();
            assert_eq!(driver.into_grammar().output, whole, "split at {}", split);
        }
    }

    #[test]
    fn test_error_position() {
        let err = parse_all("(ab\n  cd 7)").unwrap_err();
        assert_eq!(err.line, 2);
        assert_eq!(err.col, 6);
        assert_eq!(err.pos, 9);
        assert!(matches!(
            err.kind,
            ErrorKind::UnexpectedCharacter {
                found: Some('7'),
                ..
            }
        ));
    }

    #[test]
    fn test_driver_is_poisoned_after_error() {
        let mut driver = Driver::new(Lists::default());
        let first = driver.feed("(a ?").unwrap_err();
        let second = driver.feed("b)").unwrap_err();
        assert_eq!(first, second);
        assert_eq!(driver.finish().unwrap_err(), first);
    }

    #[test]
    fn test_unfinished_input_is_premature_end() {
        let err = parse_all("(ab (cd)").unwrap_err();
        assert_eq!(err.kind, ErrorKind::PrematureEndOfInput);
        assert_eq!(err.pos, 8);
    }

    #[test]
    fn test_consume_at_end_of_input() {
        let mut cursor: Cursor<State, Sexp> = Cursor::new(State::Word);
        cursor.advance(None);
        assert_eq!(cursor.consume(), Err(ErrorKind::PrematureEndOfInput));
    }

    #[test]
    fn test_ret_without_value_returns_buffer() {
        let mut cursor: Cursor<State, Sexp> = Cursor::new(State::List);
        let _ = cursor.call(State::Word, Some(State::RecordItem));
        assert_eq!(cursor.depth(), 1);
        cursor.advance(Some('x'));
        cursor.consume().unwrap();
        assert_eq!(cursor.ret_now(None), Flow::Again);
        assert_eq!(cursor.depth(), 0);
        assert_eq!(cursor.state(), State::RecordItem);
        assert_eq!(cursor.take_returned(), Some(word("x")));
    }

    #[test]
    fn test_line_and_column_tracking() {
        let mut cursor: Cursor<State, Sexp> = Cursor::new(State::Start);
        for ch in "ab\nc".chars() {
            cursor.advance(Some(ch));
        }
        assert_eq!((cursor.line(), cursor.col(), cursor.pos()), (2, 1, 3));
        cursor.advance(None);
        assert_eq!((cursor.line(), cursor.col(), cursor.pos()), (2, 1, 4));
    }
}
