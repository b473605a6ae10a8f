//! The TOML grammar, written as states over the [`cursor`](crate::cursor) engine.
//!
//! Each variant of [`State`] is one production step. States that need a
//! nested production `call` into it and name a `Record*` state to resume in;
//! the record state takes the child's return value and folds it into the
//! frame's partial result or into the document.
//!
//! The document under construction lives in [`TomlGrammar`]. Table headers
//! move the current context, which is kept as a path from the root so that
//! it can be re-resolved after every mutation.

use std::num::IntErrorKind;

use num_bigint::BigInt;
use tracing::{debug, trace};

use crate::cursor::{Cursor, Driver, Flow, Grammar};
use crate::error::{ErrorKind, ParseError};
use crate::{Array, ArrayKind, Datetime, Table, TableKind, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum State {
    Start,
    WhitespaceToEol,
    Comment,

    AssignStatement,
    RecordAssignStatement,
    Assign,
    RecordAssignKeyword,
    AssignKeywordPreDot,
    AssignKeywordPostDot,
    AssignEqual,
    AssignPreValue,
    RecordAssignValue,

    Keyword,
    BareKey,

    TableOrList,
    Table,
    TableNext,
    TableMore,
    List,
    ListNext,
    ListMore,
    ListEnd,

    Value,
    RecordValue,
    Inf,
    Inf2,
    Nan,
    Nan2,

    SingleString,
    LiteralString,
    LiteralMultiStringMaybe,
    LiteralMultiString,
    LiteralMultiOpenLf,
    LiteralMultiContent,
    LiteralMultiLf,
    LiteralMultiEnd,
    LiteralMultiEnd2,
    LiteralMultiEnd3,
    LiteralMultiEnd4,

    DoubleString,
    BasicString,
    RecordEscape,
    MultiStringMaybe,
    MultiString,
    MultiOpenLf,
    MultiContent,
    MultiLf,
    RecordMultiEscape,
    MultiEnd,
    MultiEnd2,
    MultiEnd3,
    MultiEnd4,
    MultiEscape,
    PreMultiTrim,
    MultiTrim,
    MultiTrimLf,

    Escape,
    SmallUnicode,
    LargeUnicode,
    UnicodeReturn,

    NumberSign,
    MaybeSignedInfOrNan,
    NoUnder,
    NoUnderHexOctBin,
    NumberIntegerStart,
    IntegerExponentOrDecimal,
    NumberInteger,
    NumberFloat,
    ExponentSign,
    Exponent,
    NumberOrDateTime,
    NumberOrDateTimeOnly,
    NumberBaseOrDateTime,
    IntegerHex,
    IntegerOct,
    IntegerBin,

    DateTimeOnly,
    DateTime,
    DateMonth,
    DateDay,
    StartTimeHour,
    TimeHour,
    TimeMin,
    TimeSec,
    TimeZoneOrFraction,
    DateTimeFraction,
    TimeZoneHour,
    TimeZoneSep,
    TimeZoneMin,
    OnlyTimeHour,
    OnlyTimeMin,
    OnlyTimeSec,
    OnlyTimeFractionMaybe,
    OnlyTimeFraction,

    Boolean,
    TrueR,
    TrueU,
    TrueE,
    FalseA,
    FalseL,
    FalseS,
    FalseE,

    InlineList,
    RecordInlineListValue,
    InlineListNext,

    InlineTable,
    RecordInlineTableValue,
    InlineTableNext,
    InlineTablePostComma,
}

/// What frames hand to each other.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    /// A frame's raw buffer: a key or string body, an escape replacement.
    Text(String),
    /// The segments of a dotted key collected so far.
    Key(Vec<String>),
    Value(Value),
    /// A finished `key = value`.
    Pair(Vec<String>, Value),
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Token::Text(text)
    }
}

type C = Cursor<State, Token>;

/// One segment of the path to the current table.
#[derive(Debug, Clone)]
struct Step {
    key: String,
    /// Set when the segment names an array of tables; the index of the
    /// element the path continues in.
    element: Option<usize>,
}

/// The grammar plus the document it builds.
#[derive(Debug, Default)]
pub(crate) struct TomlGrammar {
    root: Table,
    ctx: Vec<Step>,
}

impl Grammar for TomlGrammar {
    type State = State;
    type Value = Token;

    fn start(&self) -> State {
        State::Start
    }

    fn step(&mut self, c: &mut C) -> Result<Flow, ErrorKind> {
        use State::*;

        match c.state() {
            Start => start(c),
            WhitespaceToEol => whitespace_to_eol(c),
            Comment => comment(c),

            AssignStatement => Ok(c.call_now(Assign, Some(RecordAssignStatement))),
            RecordAssignStatement => {
                let (key, value) = take_pair(c)?;
                self.record_assignment(key, value)?;
                Ok(c.goto(WhitespaceToEol))
            }
            Assign => Ok(c.call_now(Keyword, Some(RecordAssignKeyword))),
            RecordAssignKeyword => record_assign_keyword(c),
            AssignKeywordPreDot => assign_keyword_pre_dot(c),
            AssignKeywordPostDot => assign_keyword_post_dot(c),
            AssignEqual => assign_equal(c),
            AssignPreValue => assign_pre_value(c),
            RecordAssignValue => record_assign_value(c),

            Keyword => keyword(c),
            BareKey => bare_key(c),

            TableOrList => table_or_list(c),
            Table => {
                self.ctx.clear();
                Ok(c.goto(TableNext))
            }
            TableNext => header_next(c, TableMore),
            TableMore => self.table_more(c),
            List => {
                self.ctx.clear();
                Ok(c.goto(ListNext))
            }
            ListNext => header_next(c, ListMore),
            ListMore => self.list_more(c),
            ListEnd => list_end(c),

            Value => value(c),
            RecordValue => {
                let value = take_value(c)?;
                Ok(c.ret_now(Some(Token::Value(value))))
            }
            Inf => expect_char(c, 'n', Inf2, "`inf`"),
            Inf2 => inf2(c),
            Nan => expect_char(c, 'a', Nan2, "`nan`"),
            Nan2 => nan2(c),

            SingleString => single_string(c),
            LiteralString => literal_string(c),
            LiteralMultiStringMaybe => multi_string_maybe(c, '\'', LiteralMultiString),
            LiteralMultiString => multi_string_open(c, LiteralMultiContent, LiteralMultiOpenLf),
            LiteralMultiOpenLf => line_feed(c, LiteralMultiContent, false),
            LiteralMultiContent => literal_multi_content(c),
            LiteralMultiLf => line_feed(c, LiteralMultiContent, true),
            LiteralMultiEnd => multi_end(c, '\'', LiteralMultiEnd2, LiteralMultiContent, 1),
            LiteralMultiEnd2 => multi_end(c, '\'', LiteralMultiEnd3, LiteralMultiContent, 2),
            LiteralMultiEnd3 => multi_end_extra(c, '\'', Some(LiteralMultiEnd4)),
            LiteralMultiEnd4 => multi_end_extra(c, '\'', None),

            DoubleString => double_string(c),
            BasicString => basic_string(c),
            RecordEscape => record_escape(c, BasicString),
            MultiStringMaybe => multi_string_maybe(c, '"', MultiString),
            MultiString => multi_string_open(c, MultiContent, MultiOpenLf),
            MultiOpenLf => line_feed(c, MultiContent, false),
            MultiContent => multi_content(c),
            MultiLf => line_feed(c, MultiContent, true),
            RecordMultiEscape => record_escape(c, MultiContent),
            MultiEnd => multi_end(c, '"', MultiEnd2, MultiContent, 1),
            MultiEnd2 => multi_end(c, '"', MultiEnd3, MultiContent, 2),
            MultiEnd3 => multi_end_extra(c, '"', Some(MultiEnd4)),
            MultiEnd4 => multi_end_extra(c, '"', None),
            MultiEscape => multi_escape(c),
            PreMultiTrim => pre_multi_trim(c),
            MultiTrim => multi_trim(c),
            MultiTrimLf => line_feed(c, MultiTrim, false),

            Escape => escape(c),
            SmallUnicode => unicode_digits(c, 4),
            LargeUnicode => unicode_digits(c, 8),
            UnicodeReturn => unicode_return(c),

            NumberSign => {
                c.consume()?;
                Ok(c.next(MaybeSignedInfOrNan))
            }
            MaybeSignedInfOrNan => maybe_signed_inf_or_nan(c),
            NoUnder => no_under(c, true),
            NoUnderHexOctBin => no_under(c, false),
            NumberIntegerStart => number_integer_start(c),
            IntegerExponentOrDecimal => integer_exponent_or_decimal(c),
            NumberInteger => number_integer(c),
            NumberFloat => number_float(c),
            ExponentSign => exponent_sign(c),
            Exponent => exponent(c),
            NumberOrDateTime => number_or_date_time(c),
            NumberOrDateTimeOnly => number_or_date_time_only(c),
            NumberBaseOrDateTime => number_base_or_date_time(c),
            IntegerHex => integer_radix(c, 16),
            IntegerOct => integer_radix(c, 8),
            IntegerBin => integer_radix(c, 2),

            DateTimeOnly => date_time_only(c),
            DateTime => date_time(c),
            DateMonth => date_month(c),
            DateDay => date_day(c),
            StartTimeHour => start_time_hour(c),
            TimeHour => time_hour(c),
            TimeMin => time_min(c, TimeSec),
            TimeSec => time_sec(c),
            TimeZoneOrFraction => time_zone_or_fraction(c),
            DateTimeFraction => date_time_fraction(c),
            TimeZoneHour => time_zone_hour(c),
            TimeZoneSep => time_zone_sep(c),
            TimeZoneMin => time_zone_min(c),
            OnlyTimeHour => only_time_hour(c),
            OnlyTimeMin => time_min(c, OnlyTimeSec),
            OnlyTimeSec => only_time_sec(c),
            OnlyTimeFractionMaybe => only_time_fraction_maybe(c),
            OnlyTimeFraction => only_time_fraction(c),

            Boolean => boolean(c),
            TrueR => expect_char(c, 'r', TrueU, "`true`"),
            TrueU => expect_char(c, 'u', TrueE, "`true`"),
            TrueE => expect_last(c, 'e', true),
            FalseA => expect_char(c, 'a', FalseL, "`false`"),
            FalseL => expect_char(c, 'l', FalseS, "`false`"),
            FalseS => expect_char(c, 's', FalseE, "`false`"),
            FalseE => expect_last(c, 'e', false),

            InlineList => inline_list(c),
            RecordInlineListValue => record_inline_list_value(c),
            InlineListNext => inline_list_next(c),

            InlineTable => inline_table(c),
            RecordInlineTableValue => record_inline_table_value(c),
            InlineTableNext => inline_table_next(c),
            InlineTablePostComma => inline_table_post_comma(c),
        }
    }
}

impl TomlGrammar {
    pub(crate) fn into_table(self) -> Table {
        self.root
    }

    fn context_path(&self, key: &str) -> String {
        let mut path: Vec<&str> = self.ctx.iter().map(|step| step.key.as_str()).collect();
        path.push(key);
        path.join(".")
    }

    /// Resolves the current context from the root.
    fn context(&mut self) -> Result<&mut Table, ErrorKind> {
        let mut table = &mut self.root;
        for (depth, step) in self.ctx.iter().enumerate() {
            let entry = table.get_mut(&step.key);
            table = match (entry, step.element) {
                (Some(Value::Table(t)), None) => t,
                (Some(Value::Array(a)), Some(index)) => match a.get_mut(index) {
                    Some(Value::Table(t)) => t,
                    _ => return Err(ErrorKind::redefinition(joined(&self.ctx[..=depth]))),
                },
                _ => return Err(ErrorKind::redefinition(joined(&self.ctx[..=depth]))),
            };
        }
        Ok(table)
    }

    fn record_assignment(&mut self, key: Vec<String>, value: Value) -> Result<(), ErrorKind> {
        let table = self.context()?;
        insert_dotted(table, key, value)
    }

    fn table_more(&mut self, c: &mut C) -> Result<Flow, ErrorKind> {
        match c.ch() {
            Some(' ' | '\t') => Ok(Flow::Next),
            Some(']') => {
                let key = take_text(c)?;
                self.declare_table(key)?;
                Ok(c.next(State::WhitespaceToEol))
            }
            Some('.') => {
                let key = take_text(c)?;
                self.descend_header(key)?;
                Ok(c.next(State::TableNext))
            }
            None => Err(ErrorKind::PrematureEndOfInput),
            found => Err(ErrorKind::unexpected(found, "`.` or `]`")),
        }
    }

    fn list_more(&mut self, c: &mut C) -> Result<Flow, ErrorKind> {
        match c.ch() {
            Some(' ' | '\t') => Ok(Flow::Next),
            Some(']') => {
                let key = take_text(c)?;
                self.append_array_table(key)?;
                Ok(c.next(State::ListEnd))
            }
            Some('.') => {
                let key = take_text(c)?;
                self.descend_header(key)?;
                Ok(c.next(State::ListNext))
            }
            None => Err(ErrorKind::PrematureEndOfInput),
            found => Err(ErrorKind::unexpected(found, "`.` or `]]`")),
        }
    }

    /// Moves the context through an intermediate header segment.
    fn descend_header(&mut self, key: String) -> Result<(), ErrorKind> {
        let path = self.context_path(&key);
        let table = self.context()?;
        if !table.contains_key(&key) {
            table.insert(key.clone(), Value::Table(Table::new()));
        }
        let element = match table.get_mut(&key) {
            Some(Value::Table(t)) if t.kind() != TableKind::Inline => None,
            Some(Value::Array(a)) if a.kind() == ArrayKind::OfTables => match a.len() {
                0 => return Err(ErrorKind::redefinition(path)),
                len => Some(len - 1),
            },
            _ => return Err(ErrorKind::redefinition(path)),
        };
        self.ctx.push(Step { key, element });
        Ok(())
    }

    /// Handles the last segment of a `[table]` header.
    fn declare_table(&mut self, key: String) -> Result<(), ErrorKind> {
        let path = self.context_path(&key);
        let table = self.context()?;
        match table.get_mut(&key) {
            None => {
                table.insert(key.clone(), Value::Table(Table::with_kind(TableKind::Declared)));
            }
            Some(Value::Table(t)) if t.kind() == TableKind::Implicit => {
                t.set_kind(TableKind::Declared);
            }
            Some(_) => return Err(ErrorKind::redefinition(path)),
        }
        trace!(table = %path, "declared table");
        self.ctx.push(Step { key, element: None });
        Ok(())
    }

    /// Handles the last segment of an `[[array]]` header.
    fn append_array_table(&mut self, key: String) -> Result<(), ErrorKind> {
        let path = self.context_path(&key);
        let table = self.context()?;
        if !table.contains_key(&key) {
            table.insert(key.clone(), Value::Array(Array::of_tables()));
        }
        let index = match table.get_mut(&key) {
            Some(Value::Array(a)) if a.kind() == ArrayKind::OfTables => {
                a.push(Value::Table(Table::with_kind(TableKind::Declared)));
                a.len() - 1
            }
            _ => return Err(ErrorKind::redefinition(path)),
        };
        trace!(array = %path, index, "appended table to array");
        self.ctx.push(Step {
            key,
            element: Some(index),
        });
        Ok(())
    }
}

fn joined(steps: &[Step]) -> String {
    steps
        .iter()
        .map(|step| step.key.as_str())
        .collect::<Vec<_>>()
        .join(".")
}

/// Assigns `value` at a dotted `key` below `target`.
///
/// Intermediate segments may only pass through tables created implicitly or
/// by other dotted keys; the final segment must not exist yet.
fn insert_dotted(target: &mut Table, key: Vec<String>, value: Value) -> Result<(), ErrorKind> {
    let Some((last, parents)) = key.split_last() else {
        return Err(ErrorKind::unexpected(None, "a key"));
    };
    let mut table = target;
    for (depth, segment) in parents.iter().enumerate() {
        if !table.contains_key(segment) {
            table.insert(segment.clone(), Value::Table(Table::with_kind(TableKind::Dotted)));
        }
        table = match table.get_mut(segment) {
            Some(Value::Table(t)) if matches!(t.kind(), TableKind::Implicit | TableKind::Dotted) => t,
            _ => return Err(ErrorKind::redefinition(key[..=depth].join("."))),
        };
    }
    if table.contains_key(last) {
        return Err(ErrorKind::redefinition(key.join(".")));
    }
    table.insert(last.clone(), value);
    Ok(())
}

// Character classes.

fn is_ws(ch: Option<char>) -> bool {
    matches!(ch, Some(' ' | '\t'))
}

fn is_bare_key_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn at_end_of_line(ch: Option<char>) -> bool {
    matches!(ch, None | Some('\n' | '\r'))
}

fn at_end_of_word(ch: Option<char>) -> bool {
    matches!(
        ch,
        None | Some('#' | '\t' | ' ' | '\n' | '\r' | ',' | ']' | '}')
    )
}

fn is_digit(ch: Option<char>) -> bool {
    matches!(ch, Some('0'..='9'))
}

fn check_control(ch: char, multiline: bool) -> Result<(), ErrorKind> {
    let allowed = ch == '\t' || (multiline && ch == '\n');
    if (ch < ' ' && !allowed) || ch == '\u{7f}' {
        Err(ErrorKind::ControlCharacterInString(ch as u32))
    } else {
        Ok(())
    }
}

fn invalid_date(msg: &str) -> ErrorKind {
    ErrorKind::InvalidDateTime(msg.to_string())
}

// Return values.

fn take_text(c: &mut C) -> Result<String, ErrorKind> {
    match c.take_returned() {
        Some(Token::Text(text)) => Ok(text),
        _ => Err(ErrorKind::unexpected(c.ch(), "a key")),
    }
}

fn take_value(c: &mut C) -> Result<Value, ErrorKind> {
    match c.take_returned() {
        Some(Token::Text(text)) => Ok(Value::String(text)),
        Some(Token::Value(value)) => Ok(value),
        _ => Err(ErrorKind::unexpected(c.ch(), "a value")),
    }
}

fn take_pair(c: &mut C) -> Result<(Vec<String>, Value), ErrorKind> {
    match c.take_returned() {
        Some(Token::Pair(key, value)) => Ok((key, value)),
        _ => Err(ErrorKind::unexpected(c.ch(), "a key/value pair")),
    }
}

fn ret_value(c: &mut C, value: Value) -> Flow {
    c.ret(Some(Token::Value(value)))
}

fn ret_value_now(c: &mut C, value: Value) -> Flow {
    c.ret_now(Some(Token::Value(value)))
}

// Top level.

fn start(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        None | Some(' ' | '\t' | '\n' | '\r') => Ok(Flow::Next),
        Some('[') => Ok(c.call(State::TableOrList, None)),
        Some('#') => Ok(c.call(State::Comment, None)),
        Some(ch) if is_bare_key_char(ch) || ch == '"' || ch == '\'' => {
            Ok(c.call_now(State::AssignStatement, None))
        }
        found => Err(ErrorKind::unexpected(found, "a key, table header or comment")),
    }
}

fn whitespace_to_eol(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t' | '\r') => Ok(Flow::Next),
        Some('#') => Ok(c.goto(State::Comment)),
        None | Some('\n') => Ok(c.ret(None)),
        found => Err(ErrorKind::unexpected(found, "a comment or end of line")),
    }
}

fn comment(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        None | Some('\n') => Ok(c.ret(None)),
        Some(ch) if ch != '\t' && ch != '\r' && (ch < ' ' || ch == '\u{7f}') => {
            Err(ErrorKind::unexpected(Some(ch), "comment text"))
        }
        Some(_) => Ok(Flow::Next),
    }
}

// Assignment.

fn record_assign_keyword(c: &mut C) -> Result<Flow, ErrorKind> {
    let key = take_text(c)?;
    match c.result_mut() {
        Some(Token::Key(keys)) => keys.push(key),
        slot => *slot = Some(Token::Key(vec![key])),
    }
    Ok(c.goto(State::AssignKeywordPreDot))
}

fn assign_keyword_pre_dot(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('.') => Ok(c.next(State::AssignKeywordPostDot)),
        Some(' ' | '\t') => Ok(Flow::Next),
        _ => Ok(c.goto(State::AssignEqual)),
    }
}

fn assign_keyword_post_dot(c: &mut C) -> Result<Flow, ErrorKind> {
    if is_ws(c.ch()) {
        Ok(Flow::Next)
    } else {
        Ok(c.call_now(State::Keyword, Some(State::RecordAssignKeyword)))
    }
}

fn assign_equal(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('=') => Ok(c.next(State::AssignPreValue)),
        None => Err(ErrorKind::PrematureEndOfInput),
        found => Err(ErrorKind::unexpected(found, "`=`")),
    }
}

fn assign_pre_value(c: &mut C) -> Result<Flow, ErrorKind> {
    if is_ws(c.ch()) {
        Ok(Flow::Next)
    } else {
        Ok(c.call_now(State::Value, Some(State::RecordAssignValue)))
    }
}

fn record_assign_value(c: &mut C) -> Result<Flow, ErrorKind> {
    let value = take_value(c)?;
    match c.take_result() {
        Some(Token::Key(key)) => Ok(c.ret_now(Some(Token::Pair(key, value)))),
        _ => Err(ErrorKind::unexpected(c.ch(), "a key")),
    }
}

// Keys.

fn keyword(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('"') => Ok(c.next(State::BasicString)),
        Some('\'') => Ok(c.next(State::LiteralString)),
        _ => Ok(c.goto(State::BareKey)),
    }
}

fn bare_key(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(ch) if is_bare_key_char(ch) => {
            c.consume()?;
            Ok(Flow::Next)
        }
        None if c.buf().is_empty() => Err(ErrorKind::PrematureEndOfInput),
        found if c.buf().is_empty() => Err(ErrorKind::unexpected(found, "a key")),
        _ => Ok(c.ret_now(None)),
    }
}

// Headers.

fn table_or_list(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('[') => Ok(c.next(State::List)),
        _ => Ok(c.goto(State::Table)),
    }
}

fn header_next(c: &mut C, more: State) -> Result<Flow, ErrorKind> {
    if is_ws(c.ch()) {
        Ok(Flow::Next)
    } else {
        Ok(c.call_now(State::Keyword, Some(more)))
    }
}

fn list_end(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(']') => Ok(c.next(State::WhitespaceToEol)),
        None => Err(ErrorKind::PrematureEndOfInput),
        found => Err(ErrorKind::unexpected(found, "`]]`")),
    }
}

// Values.

fn value(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        None => Err(ErrorKind::PrematureEndOfInput),
        Some('"') => Ok(c.next(State::DoubleString)),
        Some('\'') => Ok(c.next(State::SingleString)),
        Some('-' | '+') => Ok(c.goto(State::NumberSign)),
        Some('i') => Ok(c.next(State::Inf)),
        Some('n') => Ok(c.next(State::Nan)),
        Some('0'..='9') => Ok(c.goto(State::NumberOrDateTime)),
        Some('t' | 'f') => Ok(c.goto(State::Boolean)),
        Some('[') => Ok(c.call(State::InlineList, Some(State::RecordValue))),
        Some('{') => Ok(c.call(State::InlineTable, Some(State::RecordValue))),
        found => Err(ErrorKind::unexpected(
            found,
            "a string, number, datetime, boolean, array or inline table",
        )),
    }
}

fn expect_char(c: &mut C, want: char, then: State, expected: &'static str) -> Result<Flow, ErrorKind> {
    if c.ch() == Some(want) {
        Ok(c.next(then))
    } else {
        Err(ErrorKind::unexpected(c.ch(), expected))
    }
}

fn inf2(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.ch() != Some('f') {
        return Err(ErrorKind::unexpected(c.ch(), "`inf`"));
    }
    let inf = if c.buf() == "-" {
        f64::NEG_INFINITY
    } else {
        f64::INFINITY
    };
    Ok(ret_value(c, Value::Float(inf)))
}

fn nan2(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.ch() != Some('n') {
        return Err(ErrorKind::unexpected(c.ch(), "`nan`"));
    }
    Ok(ret_value(c, Value::Float(f64::NAN)))
}

// Literal strings.

fn single_string(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\'') => Ok(c.next(State::LiteralMultiStringMaybe)),
        _ => Ok(c.goto(State::LiteralString)),
    }
}

fn literal_string(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\'') => Ok(c.ret(None)),
        ch if at_end_of_line(ch) => Err(ErrorKind::UnterminatedString),
        Some(ch) => {
            check_control(ch, false)?;
            c.consume()?;
            Ok(Flow::Next)
        }
        None => Err(ErrorKind::UnterminatedString),
    }
}

/// After two quotes: a third opens a multiline string, anything else
/// means the string was empty.
fn multi_string_maybe(c: &mut C, quote: char, open: State) -> Result<Flow, ErrorKind> {
    if c.ch() == Some(quote) {
        Ok(c.next(open))
    } else {
        Ok(c.ret_now(None))
    }
}

/// Trims a newline directly after the opening delimiter.
fn multi_string_open(c: &mut C, content: State, crlf: State) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\r') => Ok(c.next(crlf)),
        Some('\n') => Ok(c.next(content)),
        _ => Ok(c.goto(content)),
    }
}

/// A carriage return inside a multiline string must start a CRLF pair.
fn line_feed(c: &mut C, then: State, keep: bool) -> Result<Flow, ErrorKind> {
    if c.ch() != Some('\n') {
        return Err(ErrorKind::ControlCharacterInString('\r' as u32));
    }
    if keep {
        c.consume()?;
    }
    Ok(c.next(then))
}

fn literal_multi_content(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\'') => Ok(c.next(State::LiteralMultiEnd)),
        Some('\r') => {
            c.consume()?;
            Ok(c.next(State::LiteralMultiLf))
        }
        None => Err(ErrorKind::UnterminatedString),
        Some(ch) => {
            check_control(ch, true)?;
            c.consume()?;
            Ok(Flow::Next)
        }
    }
}

/// One or two quotes seen inside a multiline string; fewer than three
/// belong to the content.
fn multi_end(c: &mut C, quote: char, then: State, content: State, seen: usize) -> Result<Flow, ErrorKind> {
    if c.ch() == Some(quote) {
        return Ok(c.next(then));
    }
    for _ in 0..seen {
        c.buf_mut().push(quote);
    }
    Ok(c.goto(content))
}

/// Quotes directly after the closing delimiter: up to two of them are
/// content that preceded it.
fn multi_end_extra(c: &mut C, quote: char, then: Option<State>) -> Result<Flow, ErrorKind> {
    if c.ch() != Some(quote) {
        return Ok(c.ret_now(None));
    }
    c.buf_mut().push(quote);
    match then {
        Some(state) => Ok(c.next(state)),
        None => Ok(c.ret(None)),
    }
}

// Basic strings.

fn double_string(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('"') => Ok(c.next(State::MultiStringMaybe)),
        _ => Ok(c.goto(State::BasicString)),
    }
}

fn basic_string(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\\') => Ok(c.call(State::Escape, Some(State::RecordEscape))),
        Some('"') => Ok(c.ret(None)),
        ch if at_end_of_line(ch) => Err(ErrorKind::UnterminatedString),
        Some(ch) => {
            check_control(ch, false)?;
            c.consume()?;
            Ok(Flow::Next)
        }
        None => Err(ErrorKind::UnterminatedString),
    }
}

fn record_escape(c: &mut C, resume: State) -> Result<Flow, ErrorKind> {
    let replacement = take_text(c)?;
    c.buf_mut().push_str(&replacement);
    Ok(c.goto(resume))
}

fn multi_content(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\\') => Ok(c.call(State::MultiEscape, Some(State::RecordMultiEscape))),
        Some('"') => Ok(c.next(State::MultiEnd)),
        Some('\r') => {
            c.consume()?;
            Ok(c.next(State::MultiLf))
        }
        None => Err(ErrorKind::UnterminatedString),
        Some(ch) => {
            check_control(ch, true)?;
            c.consume()?;
            Ok(Flow::Next)
        }
    }
}

fn multi_escape(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('\r') => Ok(c.next(State::MultiTrimLf)),
        Some('\n') => Ok(c.next(State::MultiTrim)),
        Some(' ' | '\t') => Ok(c.next(State::PreMultiTrim)),
        _ => Ok(c.goto(State::Escape)),
    }
}

/// A backslash followed by whitespace must reach the end of the line.
fn pre_multi_trim(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t') => Ok(Flow::Next),
        Some('\r') => Ok(c.next(State::MultiTrimLf)),
        Some('\n') => Ok(c.next(State::MultiTrim)),
        None => Err(ErrorKind::UnterminatedString),
        _ => Err(ErrorKind::InvalidEscapeSequence(Some(' '))),
    }
}

fn multi_trim(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t' | '\n') => Ok(Flow::Next),
        Some('\r') => Ok(c.next(State::MultiTrimLf)),
        _ => Ok(c.ret_now(Some(Token::Text(String::new())))),
    }
}

fn escape(c: &mut C) -> Result<Flow, ErrorKind> {
    let replacement = match c.ch() {
        Some('b') => '\u{8}',
        Some('t') => '\t',
        Some('n') => '\n',
        Some('f') => '\u{c}',
        Some('r') => '\r',
        Some('"') => '"',
        Some('\\') => '\\',
        Some('u') => return Ok(c.call(State::SmallUnicode, Some(State::UnicodeReturn))),
        Some('U') => return Ok(c.call(State::LargeUnicode, Some(State::UnicodeReturn))),
        None => return Err(ErrorKind::UnterminatedString),
        found => return Err(ErrorKind::InvalidEscapeSequence(found)),
    };
    Ok(c.ret(Some(Token::Text(replacement.to_string()))))
}

fn unicode_digits(c: &mut C, len: usize) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(ch) if ch.is_ascii_hexdigit() => {
            c.consume()?;
            if c.buf().len() == len {
                Ok(c.ret(None))
            } else {
                Ok(Flow::Next)
            }
        }
        Some(ch) => Err(ErrorKind::InvalidUnicodeEscape(format!(
            "expected {} hex digits, found {:?}",
            len, ch
        ))),
        None => Err(ErrorKind::UnterminatedString),
    }
}

fn unicode_return(c: &mut C) -> Result<Flow, ErrorKind> {
    let digits = take_text(c)?;
    let code = u32::from_str_radix(&digits, 16)
        .map_err(|_| ErrorKind::InvalidUnicodeEscape(format!("`{}` is not hexadecimal", digits)))?;
    if (0xD800..=0xDFFF).contains(&code) {
        return Err(ErrorKind::InvalidUnicodeEscape(format!(
            "U+{:04X} is in the reserved surrogate range",
            code
        )));
    }
    match char::from_u32(code) {
        Some(ch) => Ok(c.ret_now(Some(Token::Text(ch.to_string())))),
        None => Err(ErrorKind::InvalidUnicodeEscape(format!(
            "U+{:X} is beyond U+10FFFF",
            code
        ))),
    }
}

// Numbers.

fn maybe_signed_inf_or_nan(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('i') => Ok(c.next(State::Inf)),
        Some('n') => Ok(c.next(State::Nan)),
        _ => Ok(c.call_now(State::NoUnder, Some(State::NumberIntegerStart))),
    }
}

/// Guards the character after `_`, `.`, a sign or a base prefix.
fn no_under(c: &mut C, decimal: bool) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('_' | '.') => Err(ErrorKind::InvalidNumberLiteral("expected a digit")),
        Some('e' | 'E') if decimal => Err(ErrorKind::InvalidNumberLiteral("expected a digit")),
        ch if at_end_of_word(ch) => Err(ErrorKind::InvalidNumberLiteral("incomplete number")),
        _ => Ok(c.ret_now(None)),
    }
}

fn number_integer_start(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.ch() == Some('0') {
        c.consume()?;
        Ok(c.next(State::IntegerExponentOrDecimal))
    } else {
        Ok(c.goto(State::NumberInteger))
    }
}

fn integer_exponent_or_decimal(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('.') => {
            c.consume()?;
            Ok(c.call(State::NoUnder, Some(State::NumberFloat)))
        }
        Some('e' | 'E') => {
            c.consume()?;
            Ok(c.next(State::ExponentSign))
        }
        Some('0'..='9' | '_') => Err(ErrorKind::InvalidNumberLiteral(
            "leading zeros are not allowed",
        )),
        _ => {
            let value = integer(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

fn number_integer(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('0'..='9') => {
            c.consume()?;
            Ok(Flow::Next)
        }
        Some('_') => Ok(c.call(State::NoUnder, None)),
        Some('e' | 'E') => {
            c.consume()?;
            Ok(c.next(State::ExponentSign))
        }
        Some('.') => {
            c.consume()?;
            Ok(c.call(State::NoUnder, Some(State::NumberFloat)))
        }
        _ => {
            let value = integer(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

fn number_float(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('_') => Ok(c.call(State::NoUnder, Some(State::NumberFloat))),
        Some('0'..='9') => {
            c.consume()?;
            Ok(Flow::Next)
        }
        Some('e' | 'E') => {
            c.consume()?;
            Ok(c.next(State::ExponentSign))
        }
        _ => {
            let value = float(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

fn exponent_sign(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('0'..='9') => Ok(c.goto(State::Exponent)),
        Some('-' | '+') => {
            c.consume()?;
            Ok(c.call(State::NoUnder, Some(State::Exponent)))
        }
        _ => Err(ErrorKind::InvalidNumberLiteral("expected an exponent")),
    }
}

fn exponent(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('0'..='9') => {
            c.consume()?;
            Ok(Flow::Next)
        }
        Some('_') => Ok(c.call(State::NoUnder, None)),
        _ => {
            let value = float(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

fn number_or_date_time(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.ch() == Some('0') {
        c.consume()?;
        Ok(c.next(State::NumberBaseOrDateTime))
    } else {
        Ok(c.goto(State::NumberOrDateTimeOnly))
    }
}

/// Up to four unsigned digits may still turn out to be a year or an hour.
fn number_or_date_time_only(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('_') => Ok(c.call(State::NoUnder, Some(State::NumberInteger))),
        Some('0'..='9') => {
            c.consume()?;
            if c.buf().len() > 4 {
                Ok(c.next(State::NumberInteger))
            } else {
                Ok(Flow::Next)
            }
        }
        Some('e' | 'E') => {
            c.consume()?;
            Ok(c.next(State::ExponentSign))
        }
        Some('.') => {
            c.consume()?;
            Ok(c.call(State::NoUnder, Some(State::NumberFloat)))
        }
        Some('-') => Ok(c.goto(State::DateTime)),
        Some(':') => Ok(c.goto(State::OnlyTimeHour)),
        _ => {
            let value = integer(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

/// After a leading `0`: a base prefix, a fraction, a date or time, or zero.
fn number_base_or_date_time(c: &mut C) -> Result<Flow, ErrorKind> {
    let radix = match c.ch() {
        Some('b') => State::IntegerBin,
        Some('o') => State::IntegerOct,
        Some('x') => State::IntegerHex,
        Some('.' | 'e' | 'E') => return Ok(c.goto(State::NumberInteger)),
        Some('0'..='9') => return Ok(c.goto(State::DateTimeOnly)),
        Some('_') => {
            return Err(ErrorKind::InvalidNumberLiteral(
                "leading zeros are not allowed",
            ))
        }
        _ => return Ok(ret_value_now(c, Value::Integer(0))),
    };
    c.consume()?;
    Ok(c.call(State::NoUnderHexOctBin, Some(radix)))
}

fn integer_radix(c: &mut C, radix: u32) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(ch) if ch.is_digit(radix) => {
            c.consume()?;
            Ok(Flow::Next)
        }
        Some('_') => Ok(c.call(State::NoUnderHexOctBin, None)),
        Some(ch) if ch.is_ascii_alphanumeric() => Err(ErrorKind::InvalidNumberLiteral(match radix {
            16 => "invalid hexadecimal digit",
            8 => "invalid octal digit",
            _ => "invalid binary digit",
        })),
        _ => {
            let value = integer(c.buf())?;
            Ok(ret_value_now(c, value))
        }
    }
}

/// Converts collected digits, falling back to a big integer on overflow.
fn integer(text: &str) -> Result<Value, ErrorKind> {
    let (radix, digits) = match text.get(..2) {
        Some("0x") => (16, &text[2..]),
        Some("0o") => (8, &text[2..]),
        Some("0b") => (2, &text[2..]),
        _ => (10, text.strip_prefix('+').unwrap_or(text)),
    };
    if digits.is_empty() || digits == "-" {
        return Err(ErrorKind::InvalidNumberLiteral("expected digits"));
    }
    match i64::from_str_radix(digits, radix) {
        Ok(i) => Ok(Value::Integer(i)),
        Err(e) if matches!(e.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
            BigInt::parse_bytes(digits.as_bytes(), radix)
                .map(Value::BigInt)
                .ok_or(ErrorKind::InvalidNumberLiteral("not a number"))
        }
        Err(_) => Err(ErrorKind::InvalidNumberLiteral("not a number")),
    }
}

fn float(text: &str) -> Result<Value, ErrorKind> {
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ErrorKind::InvalidNumberLiteral("not a float"))
}

// Dates and times.

/// Moves the buffered component into the frame's datetime text.
fn flush(c: &mut C, separator: &str) {
    let part = c.take_buf();
    match c.result_mut() {
        Some(Token::Text(text)) => {
            text.push_str(separator);
            text.push_str(&part);
        }
        slot => *slot = Some(Token::Text(part)),
    }
}

fn datetime_text(c: &mut C) -> String {
    match c.take_result() {
        Some(Token::Text(text)) => text,
        _ => String::new(),
    }
}

/// Two or three digits after a leading zero: only a year or an hour can follow.
fn date_time_only(c: &mut C) -> Result<Flow, ErrorKind> {
    let ch = c.ch();
    if c.buf().len() < 4 {
        match ch {
            Some('0'..='9') => {
                c.consume()?;
                Ok(Flow::Next)
            }
            Some(':') => Ok(c.goto(State::OnlyTimeHour)),
            ch if at_end_of_word(ch) => Err(ErrorKind::InvalidNumberLiteral(
                "leading zeros are not allowed",
            )),
            _ => Err(invalid_date("years must be four digits")),
        }
    } else {
        match ch {
            Some('-') => Ok(c.goto(State::DateTime)),
            ch if at_end_of_word(ch) => Err(ErrorKind::InvalidNumberLiteral(
                "leading zeros are not allowed",
            )),
            _ => Err(invalid_date("expected `-` after the year")),
        }
    }
}

fn date_time(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.buf().len() != 4 {
        return Err(invalid_date("years must be four digits"));
    }
    flush(c, "");
    Ok(c.next(State::DateMonth))
}

fn date_month(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('-') if c.buf().len() == 2 => {
            flush(c, "-");
            Ok(c.next(State::DateDay))
        }
        Some('0'..='9') if c.buf().len() < 2 => {
            c.consume()?;
            Ok(Flow::Next)
        }
        _ => Err(invalid_date("months must be two digits")),
    }
}

fn date_day(c: &mut C) -> Result<Flow, ErrorKind> {
    let complete = c.buf().len() == 2;
    match c.ch() {
        Some('0'..='9') if !complete => {
            c.consume()?;
            Ok(Flow::Next)
        }
        Some('T' | 't') if complete => {
            flush(c, "-");
            Ok(c.next(State::TimeHour))
        }
        Some(' ') if complete => {
            flush(c, "-");
            Ok(c.next(State::StartTimeHour))
        }
        ch if complete && at_end_of_word(ch) => {
            flush(c, "-");
            let date = Datetime::local_date(&datetime_text(c))?;
            Ok(ret_value_now(c, Value::Datetime(date)))
        }
        _ => Err(invalid_date("days must be two digits")),
    }
}

/// After a date and a space: either a time follows or the value was a date.
fn start_time_hour(c: &mut C) -> Result<Flow, ErrorKind> {
    if is_digit(c.ch()) {
        Ok(c.goto(State::TimeHour))
    } else if at_end_of_word(c.ch()) {
        let date = Datetime::local_date(&datetime_text(c))?;
        Ok(ret_value_now(c, Value::Datetime(date)))
    } else {
        Err(invalid_date("expected a time after the date"))
    }
}

fn time_hour(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(':') if c.buf().len() == 2 => {
            flush(c, "T");
            Ok(c.next(State::TimeMin))
        }
        Some('0'..='9') if c.buf().len() < 2 => {
            c.consume()?;
            Ok(Flow::Next)
        }
        _ => Err(invalid_date("hours must be two digits")),
    }
}

fn time_min(c: &mut C, seconds: State) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(':') if c.buf().len() == 2 => {
            flush(c, ":");
            Ok(c.next(seconds))
        }
        Some('0'..='9') if c.buf().len() < 2 => {
            c.consume()?;
            Ok(Flow::Next)
        }
        _ => Err(invalid_date("minutes must be two digits")),
    }
}

fn time_sec(c: &mut C) -> Result<Flow, ErrorKind> {
    if !is_digit(c.ch()) {
        return Err(invalid_date("seconds must be two digits"));
    }
    c.consume()?;
    if c.buf().len() == 2 {
        flush(c, ":");
        Ok(c.next(State::TimeZoneOrFraction))
    } else {
        Ok(Flow::Next)
    }
}

fn time_zone_or_fraction(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('.') => {
            c.consume()?;
            Ok(c.next(State::DateTimeFraction))
        }
        _ => finish_seconds(c),
    }
}

fn date_time_fraction(c: &mut C) -> Result<Flow, ErrorKind> {
    if is_digit(c.ch()) {
        c.consume()?;
        return Ok(Flow::Next);
    }
    if c.buf().len() == 1 {
        return Err(invalid_date("expected a digit after `.`"));
    }
    flush(c, "");
    finish_seconds(c)
}

/// Decides between a zoned and a floating date-time after the seconds.
fn finish_seconds(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('-' | '+') => {
            c.consume()?;
            Ok(c.next(State::TimeZoneHour))
        }
        Some('Z' | 'z') => {
            let text = datetime_text(c) + "Z";
            let dt = Datetime::offset_datetime(&text)?;
            Ok(ret_value(c, Value::Datetime(dt)))
        }
        ch if at_end_of_word(ch) => {
            let dt = Datetime::local_datetime(&datetime_text(c))?;
            Ok(ret_value_now(c, Value::Datetime(dt)))
        }
        _ => Err(invalid_date("expected a fraction, `Z` or an offset")),
    }
}

fn time_zone_hour(c: &mut C) -> Result<Flow, ErrorKind> {
    if !is_digit(c.ch()) {
        return Err(invalid_date("offset hours must be two digits"));
    }
    c.consume()?;
    if c.buf().len() == 3 {
        Ok(c.next(State::TimeZoneSep))
    } else {
        Ok(Flow::Next)
    }
}

fn time_zone_sep(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.ch() != Some(':') {
        return Err(invalid_date("expected `:` in the offset"));
    }
    c.consume()?;
    Ok(c.next(State::TimeZoneMin))
}

fn time_zone_min(c: &mut C) -> Result<Flow, ErrorKind> {
    if !is_digit(c.ch()) {
        return Err(invalid_date("offset minutes must be two digits"));
    }
    c.consume()?;
    if c.buf().len() < 6 {
        return Ok(Flow::Next);
    }
    flush(c, "");
    let dt = Datetime::offset_datetime(&datetime_text(c))?;
    Ok(ret_value(c, Value::Datetime(dt)))
}

fn only_time_hour(c: &mut C) -> Result<Flow, ErrorKind> {
    if c.buf().len() != 2 {
        return Err(invalid_date("hours must be two digits"));
    }
    flush(c, "");
    Ok(c.next(State::OnlyTimeMin))
}

fn only_time_sec(c: &mut C) -> Result<Flow, ErrorKind> {
    if !is_digit(c.ch()) {
        return Err(invalid_date("seconds must be two digits"));
    }
    c.consume()?;
    if c.buf().len() == 2 {
        flush(c, ":");
        Ok(c.next(State::OnlyTimeFractionMaybe))
    } else {
        Ok(Flow::Next)
    }
}

fn only_time_fraction_maybe(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('.') => {
            c.consume()?;
            Ok(c.next(State::OnlyTimeFraction))
        }
        ch if at_end_of_word(ch) => {
            let time = Datetime::local_time(&datetime_text(c))?;
            Ok(ret_value_now(c, Value::Datetime(time)))
        }
        _ => Err(invalid_date("expected a fraction or the end of the time")),
    }
}

fn only_time_fraction(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('0'..='9') => {
            c.consume()?;
            Ok(Flow::Next)
        }
        ch if at_end_of_word(ch) && c.buf().len() > 1 => {
            flush(c, "");
            let time = Datetime::local_time(&datetime_text(c))?;
            Ok(ret_value_now(c, Value::Datetime(time)))
        }
        _ => Err(invalid_date("expected a digit after `.`")),
    }
}

// Booleans.

fn boolean(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some('t') => Ok(c.next(State::TrueR)),
        Some('f') => Ok(c.next(State::FalseA)),
        found => Err(ErrorKind::unexpected(found, "`true` or `false`")),
    }
}

fn expect_last(c: &mut C, want: char, value: bool) -> Result<Flow, ErrorKind> {
    if c.ch() == Some(want) {
        Ok(ret_value(c, Value::Boolean(value)))
    } else {
        Err(ErrorKind::unexpected(
            c.ch(),
            if value { "`true`" } else { "`false`" },
        ))
    }
}

// Inline arrays.

fn inline_list(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t' | '\r' | '\n') => Ok(Flow::Next),
        None => Err(ErrorKind::UnterminatedArray),
        Some('#') => Ok(c.call(State::Comment, None)),
        Some(']') => {
            let array = match c.take_result() {
                Some(Token::Value(value @ Value::Array(_))) => value,
                _ => Value::Array(Array::new()),
            };
            Ok(ret_value(c, array))
        }
        _ => Ok(c.call_now(State::Value, Some(State::RecordInlineListValue))),
    }
}

/// The first element fixes the array's type; later ones must match it.
fn record_inline_list_value(c: &mut C) -> Result<Flow, ErrorKind> {
    let value = take_value(c)?;
    match c.result_mut() {
        Some(Token::Value(Value::Array(array))) => {
            if let Some(first) = array.first() {
                if first.kind() != value.kind() {
                    return Err(ErrorKind::MixedArrayTypes {
                        expected: first.kind(),
                        found: value.kind(),
                    });
                }
            }
            array.push(value);
        }
        slot => *slot = Some(Token::Value(Value::Array(Array::from(vec![value])))),
    }
    Ok(c.goto(State::InlineListNext))
}

fn inline_list_next(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t' | '\r' | '\n') => Ok(Flow::Next),
        None => Err(ErrorKind::UnterminatedArray),
        Some('#') => Ok(c.call(State::Comment, None)),
        Some(',') => Ok(c.next(State::InlineList)),
        Some(']') => Ok(c.goto(State::InlineList)),
        found => Err(ErrorKind::unexpected(found, "`,` or `]`")),
    }
}

// Inline tables.

fn inline_table_breaks(ch: Option<char>) -> bool {
    matches!(ch, None | Some('#' | '\n' | '\r'))
}

fn inline_table(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t') => Ok(Flow::Next),
        ch if inline_table_breaks(ch) => Err(ErrorKind::UnterminatedInlineTable),
        Some('}') => {
            let table = match c.take_result() {
                Some(Token::Value(value @ Value::Table(_))) => value,
                _ => Value::Table(Table::inline()),
            };
            Ok(ret_value(c, table))
        }
        _ => {
            if c.result().is_none() {
                *c.result_mut() = Some(Token::Value(Value::Table(Table::inline())));
            }
            Ok(c.call_now(State::Assign, Some(State::RecordInlineTableValue)))
        }
    }
}

fn record_inline_table_value(c: &mut C) -> Result<Flow, ErrorKind> {
    let (key, value) = take_pair(c)?;
    let ch = c.ch();
    match c.result_mut() {
        Some(Token::Value(Value::Table(table))) => insert_dotted(table, key, value)?,
        _ => return Err(ErrorKind::unexpected(ch, "an inline table")),
    }
    Ok(c.goto(State::InlineTableNext))
}

fn inline_table_next(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t') => Ok(Flow::Next),
        ch if inline_table_breaks(ch) => Err(ErrorKind::UnterminatedInlineTable),
        Some(',') => Ok(c.next(State::InlineTablePostComma)),
        Some('}') => Ok(c.goto(State::InlineTable)),
        found => Err(ErrorKind::unexpected(found, "`,` or `}`")),
    }
}

fn inline_table_post_comma(c: &mut C) -> Result<Flow, ErrorKind> {
    match c.ch() {
        Some(' ' | '\t') => Ok(Flow::Next),
        ch if inline_table_breaks(ch) => Err(ErrorKind::UnterminatedInlineTable),
        found @ Some(',' | '}') => Err(ErrorKind::unexpected(found, "a key after `,`")),
        _ => Ok(c.goto(State::InlineTable)),
    }
}

/// An incremental TOML parser.
///
/// Input may be split anywhere, including in the middle of a token or a
/// multi-byte character boundary between `&str` chunks; the result is the
/// same as parsing the concatenation in one go.
///
/// # Examples
///
/// ```rust
/// use toml_cursor::Parser;
///
/// let mut parser = Parser::new();
/// parser.feed("name = \"cur").unwrap();
/// parser.feed("sor\"\nversion = 1").unwrap();
/// let table = parser.finish().unwrap();
///
/// assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("cursor"));
/// assert_eq!(table.get("version").and_then(|v| v.as_integer()), Some(1));
/// ```
#[derive(Debug)]
pub struct Parser {
    driver: Driver<TomlGrammar>,
}

impl Parser {
    #[must_use]
    pub fn new() -> Self {
        Parser {
            driver: Driver::new(TomlGrammar::default()),
        }
    }

    /// Parses the next chunk of the document.
    ///
    /// # Errors
    ///
    /// Returns the first grammar violation. After an error every further
    /// call returns the same error.
    pub fn feed(&mut self, chunk: &str) -> Result<(), ParseError> {
        self.driver.feed(chunk)
    }

    /// Signals end of input and returns the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is incomplete or an earlier chunk
    /// failed to parse.
    pub fn finish(mut self) -> Result<Table, ParseError> {
        self.driver.finish()?;
        let table = self.driver.into_grammar().into_table();
        debug!(keys = table.len(), "parse finished");
        Ok(table)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}
