//! Graphviz DOT reader using winnow.
//!
//! Extracts node names and edges from a DOT document, in declaration order. Attribute
//! lists, attribute statements and `ID = ID` assignments are parsed for syntax and then
//! dropped; only graph topology is kept.
//!
//! IDs are returned in their raw form: a quoted ID keeps its surrounding quotes and its
//! escape sequences. Canonicalization is the graph's job, not the reader's.

use std::collections::HashSet;

use thiserror::Error;
use winnow::{
    ascii::{digit0, digit1, line_ending, till_line_ending},
    combinator::{alt, cut_err, fail, opt},
    error::{StrContext, StrContextValue},
    prelude::*,
    token::{any, take_till, take_until, take_while},
};

/// Reserved DOT keywords (matched case-insensitively).
const KEYWORDS: &[&str] = &["strict", "graph", "digraph", "node", "edge", "subgraph"];

/// A DOT syntax error with a 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("DOT syntax error at line {line}, column {col}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub col: usize,
    pub message: String,
}

/// The topology of a parsed DOT document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotGraph {
    /// `strict` keyword present.
    pub strict: bool,
    /// `digraph` (true) or `graph` (false).
    pub directed: bool,
    /// Optional graph ID, raw.
    pub id: Option<String>,
    /// Every node mention (node statements and edge endpoints), raw, in order of appearance.
    pub nodes: Vec<String>,
    /// Every edge as `(source, target)`, raw, in declaration order.
    pub edges: Vec<(String, String)>,
}

/// Parse a DOT document.
pub fn parse_dot(source: &str) -> Result<DotGraph, ParseError> {
    parse_graph.parse(source).map_err(|err| {
        let consumed = &source[..err.offset()];
        let line = consumed.matches('\n').count() + 1;
        let col = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        let mut message = err.inner().to_string().replace('\n', ": ");
        if message.is_empty() {
            message = "unexpected input".to_string();
        }
        ParseError { line, col, message }
    })
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// `[strict] (graph | digraph) [ID] '{' stmt_list '}'`
fn parse_graph(input: &mut &str) -> PResult<DotGraph> {
    // `#` lines are C preprocessor output; the document starts at a line start.
    skip_trivia(input, true)?;

    let mut graph = DotGraph {
        strict: keyword(input, "strict")?,
        ..DotGraph::default()
    };
    graph.directed = if keyword(input, "digraph")? {
        true
    } else if keyword(input, "graph")? {
        false
    } else {
        return expected(input, "'graph' or 'digraph'");
    };

    ws(input)?;
    if !input.starts_with('{') {
        graph.id = Some(parse_id(input)?);
    }

    expect_char(input, '{')?;
    let mut members = Vec::new();
    parse_stmt_list(input, &mut graph, &mut members)?;
    expect_char(input, '}')?;

    ws(input)?;
    if !input.is_empty() {
        return invalid(input, "trailing content", "end of input after graph body");
    }
    Ok(graph)
}

/// Statements up to (not including) the closing `}`.
/// Every node mentioned is appended to `members`.
fn parse_stmt_list(
    input: &mut &str,
    graph: &mut DotGraph,
    members: &mut Vec<String>,
) -> PResult<()> {
    loop {
        ws(input)?;
        if input.is_empty() {
            return expected(input, "'}' before end of input");
        }
        if input.starts_with('}') {
            return Ok(());
        }
        parse_stmt(input, graph, members)?;
        eat_char(input, ';')?;
    }
}

fn parse_stmt(input: &mut &str, graph: &mut DotGraph, members: &mut Vec<String>) -> PResult<()> {
    // attr_stmt: (graph | node | edge) attr_list
    if keyword(input, "graph")? || keyword(input, "node")? || keyword(input, "edge")? {
        return parse_attr_lists(input, true);
    }

    if at_subgraph(*input) {
        let operand = parse_subgraph(input, graph, members)?;
        return parse_edge_rhs(input, graph, operand, members);
    }

    let name = parse_id(input)?;
    // ID '=' ID
    if eat_char(input, '=')? {
        parse_id(input)?;
        return Ok(());
    }
    skip_port(input)?;
    graph.nodes.push(name.clone());
    members.push(name.clone());
    parse_edge_rhs(input, graph, vec![name], members)
}

/// `(edgeop operand)* [attr_list]`, with `first` as the leftmost operand.
/// Chains expand pairwise; subgraph operands expand to all of their members.
fn parse_edge_rhs(
    input: &mut &str,
    graph: &mut DotGraph,
    first: Vec<String>,
    members: &mut Vec<String>,
) -> PResult<()> {
    let mut left = first;
    loop {
        ws(input)?;
        let at_op = *input;
        let Some(op) = opt(alt(("->", "--"))).parse_next(input)? else {
            break;
        };
        if graph.directed && op == "--" {
            *input = at_op;
            return invalid(input, "edge operator", "'->' instead of '--' in a digraph");
        }
        if !graph.directed && op == "->" {
            *input = at_op;
            return invalid(
                input,
                "edge operator",
                "'--' instead of '->' in an undirected graph",
            );
        }

        let right = parse_operand(input, graph, members)?;
        for src in &left {
            for dst in &right {
                graph.edges.push((src.clone(), dst.clone()));
            }
        }
        left = right;
    }
    parse_attr_lists(input, false)
}

fn parse_operand(
    input: &mut &str,
    graph: &mut DotGraph,
    members: &mut Vec<String>,
) -> PResult<Vec<String>> {
    if at_subgraph(*input) {
        return parse_subgraph(input, graph, members);
    }
    let name = parse_id(input)?;
    skip_port(input)?;
    graph.nodes.push(name.clone());
    members.push(name.clone());
    Ok(vec![name])
}

/// `[subgraph [ID]] '{' stmt_list '}'`. Returns the subgraph's distinct members in
/// order of first mention; they are also added to the enclosing `members`.
fn parse_subgraph(
    input: &mut &str,
    graph: &mut DotGraph,
    members: &mut Vec<String>,
) -> PResult<Vec<String>> {
    if keyword(input, "subgraph")? {
        ws(input)?;
        if !input.starts_with('{') {
            parse_id(input)?;
        }
    }
    expect_char(input, '{')?;
    let mut inner = Vec::new();
    parse_stmt_list(input, graph, &mut inner)?;
    expect_char(input, '}')?;

    let mut seen = HashSet::new();
    inner.retain(|name| seen.insert(name.clone()));
    members.extend(inner.iter().cloned());
    Ok(inner)
}

fn at_subgraph(input: &str) -> bool {
    let mut rest = input;
    if ws(&mut rest).is_err() {
        return false;
    }
    rest.starts_with('{') || matches!(keyword(&mut rest, "subgraph"), Ok(true))
}

/// `[':' ID [':' ID]]`; the port and compass point are dropped.
fn skip_port(input: &mut &str) -> PResult<()> {
    if eat_char(input, ':')? {
        parse_id(input)?;
        if eat_char(input, ':')? {
            parse_id(input)?;
        }
    }
    Ok(())
}

/// Zero or more `'[' (ID ['=' ID] [';' | ','])* ']'`. With `required`, at least one.
fn parse_attr_lists(input: &mut &str, required: bool) -> PResult<()> {
    let mut parsed_any = false;
    while eat_char(input, '[')? {
        parsed_any = true;
        while !eat_char(input, ']')? {
            parse_id(input)?;
            if eat_char(input, '=')? {
                parse_id(input)?;
            }
            if !eat_char(input, ';')? {
                eat_char(input, ',')?;
            }
        }
    }
    if required && !parsed_any {
        return expected(input, "'['");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// IDs
// ---------------------------------------------------------------------------

/// Any DOT ID, raw. Bare keywords are rejected; quote them to use them as names.
fn parse_id(input: &mut &str) -> PResult<String> {
    ws(input)?;
    let start = *input;
    if let Some(word) = opt(bare_ident).parse_next(input)? {
        if KEYWORDS.iter().any(|kw| word.eq_ignore_ascii_case(kw)) {
            *input = start;
            return invalid(input, "identifier", "a quoted string, not the keyword");
        }
        return Ok(word.to_string());
    }
    alt((
        quoted_id,
        html.map(str::to_owned),
        numeral.map(str::to_owned),
        |input: &mut &str| expected(input, "identifier"),
    ))
    .parse_next(input)
}

/// Letters, digits, `_` and non-ASCII, not starting with a digit.
fn bare_ident<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_while(1.., is_ident_continue)
        .verify(|word: &str| word.starts_with(is_ident_start))
        .parse_next(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_continue(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

/// `-?(.digits | digits[.digits])`
fn numeral<'s>(input: &mut &'s str) -> PResult<&'s str> {
    (
        opt('-'),
        alt((('.', digit1).void(), (digit1, opt(('.', digit0))).void())),
    )
        .take()
        .parse_next(input)
}

/// One or more quoted strings joined with `+`; `"a" + "b"` is `"ab"`.
fn quoted_id(input: &mut &str) -> PResult<String> {
    let mut text = quoted.parse_next(input)?;
    loop {
        let before = *input;
        ws(input)?;
        if opt('+').parse_next(input)?.is_none() {
            *input = before;
            return Ok(text);
        }
        ws(input)?;
        let next = cut_err(quoted)
            .context(StrContext::Expected(StrContextValue::Description(
                "quoted string after '+'",
            )))
            .parse_next(input)?;
        text.pop();
        text.push_str(&next[1..]);
    }
}

/// A double-quoted string, quotes and escapes kept. Backslash-newline is a line
/// continuation and is removed.
fn quoted(input: &mut &str) -> PResult<String> {
    let _: char = '"'.parse_next(input)?;
    let mut text = String::from('"');
    loop {
        let chunk: &str = take_till(0.., ['"', '\\']).parse_next(input)?;
        text.push_str(chunk);
        let c: char = cut_err(any)
            .context(StrContext::Label("quoted string"))
            .context(StrContext::Expected(StrContextValue::Description(
                "closing '\"'",
            )))
            .parse_next(input)?;
        if c == '"' {
            text.push('"');
            return Ok(text);
        }
        if opt(line_ending).parse_next(input)?.is_some() {
            continue;
        }
        text.push('\\');
        if let Some(escaped) = opt(any).parse_next(input)? {
            text.push(escaped);
        }
    }
}

/// `<...>` with balanced angle brackets.
fn html<'s>(input: &mut &'s str) -> PResult<&'s str> {
    let start = *input;
    let _: char = '<'.parse_next(input)?;
    let mut depth = 1usize;
    while depth > 0 {
        let c: char = cut_err(any)
            .context(StrContext::Label("HTML string"))
            .context(StrContext::Expected(StrContextValue::Description(
                "closing '>'",
            )))
            .parse_next(input)?;
        match c {
            '<' => depth += 1,
            '>' => depth -= 1,
            _ => {}
        }
    }
    Ok(&start[..start.len() - input.len()])
}

// ---------------------------------------------------------------------------
// Tokens and trivia
// ---------------------------------------------------------------------------

/// Skip whitespace and comments.
fn ws(input: &mut &str) -> PResult<()> {
    skip_trivia(input, false)
}

/// `//` and `/* */` comments anywhere; `#` lines only at the start of a line.
fn skip_trivia(input: &mut &str, mut line_start: bool) -> PResult<()> {
    loop {
        let _: &str = take_while(0.., |c: char| c.is_whitespace() && c != '\n').parse_next(input)?;
        if input.starts_with('\n') {
            '\n'.void().parse_next(input)?;
            line_start = true;
        } else if input.starts_with("//") || (line_start && input.starts_with('#')) {
            let _: &str = till_line_ending.parse_next(input)?;
        } else if input.starts_with("/*") {
            block_comment.parse_next(input)?;
            line_start = false;
        } else {
            return Ok(());
        }
    }
}

fn block_comment(input: &mut &str) -> PResult<()> {
    let _: &str = "/*".parse_next(input)?;
    cut_err((take_until(0.., "*/"), "*/"))
        .context(StrContext::Label("block comment"))
        .context(StrContext::Expected(StrContextValue::Description(
            "closing '*/'",
        )))
        .void()
        .parse_next(input)
}

/// Consume `kw` (case-insensitive) if it is the next whole word.
fn keyword(input: &mut &str, kw: &str) -> PResult<bool> {
    ws(input)?;
    let word = opt(bare_ident.verify(|word: &str| word.eq_ignore_ascii_case(kw)))
        .parse_next(input)?;
    Ok(word.is_some())
}

fn eat_char(input: &mut &str, c: char) -> PResult<bool> {
    ws(input)?;
    Ok(opt(c).parse_next(input)?.is_some())
}

fn expect_char(input: &mut &str, c: char) -> PResult<()> {
    ws(input)?;
    cut_err(c)
        .context(StrContext::Expected(StrContextValue::CharLiteral(c)))
        .void()
        .parse_next(input)
}

/// Fail here, without backtracking, expecting `what`.
fn expected<T>(input: &mut &str, what: &'static str) -> PResult<T> {
    cut_err(fail)
        .context(StrContext::Expected(StrContextValue::Description(what)))
        .parse_next(input)
}

/// Fail here, without backtracking, on an invalid `label`.
fn invalid<T>(input: &mut &str, label: &'static str, what: &'static str) -> PResult<T> {
    cut_err(fail)
        .context(StrContext::Label(label))
        .context(StrContext::Expected(StrContextValue::Description(what)))
        .parse_next(input)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
