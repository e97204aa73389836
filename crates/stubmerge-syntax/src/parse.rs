//! Chain parser: recognizes fluent call chains in a token stream.
//!
//! A chain is a dotted receiver path followed by one or more calls:
//! `Mockito.when(mock.greet()).thenReturn("a").thenReturn("b")`. Calls
//! nested inside argument lists are consumed opaquely (balanced
//! parentheses, string-aware via the lexer) and never become chains of
//! their own, which matches how chain collection stops at expression-list
//! boundaries in a full syntax tree.
//!
//! Parsing never fails. Text that does not form a chain is skipped token by
//! token, and a chain cut short by malformed input (an unbalanced argument
//! list, end of file) keeps the calls parsed up to that point.

use tracing::trace;

use crate::lexer::{Token, TokenKind, lex};
use crate::model::{
    ArgumentExpr, Invocation, InvocationId, SourceModel, TextRange,
};

/// Parses `text` into a [`SourceModel`] of every call chain it contains.
pub fn parse_source(text: &str) -> SourceModel {
    let mut parser = Parser {
        text,
        tokens: lex(text),
        pos: 0,
        invocations: Vec::new(),
        roots: Vec::new(),
    };
    parser.parse_all();
    trace!(
        chains = parser.roots.len(),
        calls = parser.invocations.len(),
        "parsed source model"
    );
    SourceModel::new(parser.invocations, parser.roots)
}

struct Parser<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    invocations: Vec<Invocation>,
    roots: Vec<InvocationId>,
}

impl Parser<'_> {
    fn parse_all(&mut self) {
        while self.pos < self.tokens.len() {
            if !self.try_parse_chain() {
                self.pos += 1;
            }
        }
    }

    fn kind_at(&self, index: usize) -> Option<&TokenKind> {
        self.tokens.get(index).map(|t| &t.kind)
    }

    /// Attempts to parse a chain starting at the current token. Restores
    /// the position and returns `false` if no chain starts here.
    fn try_parse_chain(&mut self) -> bool {
        let start_pos = self.pos;
        if self.kind_at(start_pos) != Some(&TokenKind::Ident) {
            return false;
        }

        // Walk the dotted path until an identifier directly followed by a
        // parenthesis: that identifier is the first method name, everything
        // before it the receiver.
        let mut method_pos = start_pos;
        loop {
            match (self.kind_at(method_pos + 1), self.kind_at(method_pos + 2))
            {
                (Some(TokenKind::LParen), _) => break,
                (Some(TokenKind::Dot), Some(TokenKind::Ident)) => {
                    method_pos += 2;
                }
                _ => return false,
            }
        }

        let receiver = (method_pos > start_pos).then(|| {
            let start = self.tokens[start_pos].range.start;
            // The token before the method name is the trailing dot; the
            // receiver ends at the identifier before it.
            let end = self.tokens[method_pos - 2].range.end;
            self.text[start..end].to_owned()
        });

        let chain_start = self.tokens[start_pos].range.start;
        self.pos = method_pos;
        let Some(root) = self.parse_call(chain_start, receiver, None) else {
            self.pos = start_pos;
            return false;
        };

        // Trailing `.method(args)` links.
        let mut previous = root;
        while let (
            Some(TokenKind::Dot),
            Some(TokenKind::Ident),
            Some(TokenKind::LParen),
        ) = (
            self.kind_at(self.pos),
            self.kind_at(self.pos + 1),
            self.kind_at(self.pos + 2),
        ) {
            self.pos += 1; // consume the dot
            let Some(call) =
                self.parse_call(chain_start, None, Some(previous))
            else {
                break;
            };
            self.invocations[previous.index()].next = Some(call);
            previous = call;
        }

        self.roots.push(root);
        true
    }

    /// Parses `method(args)` at the current position. Returns `None` and
    /// leaves the chain as-is when the argument list never closes.
    fn parse_call(
        &mut self,
        chain_start: usize,
        receiver: Option<String>,
        qualifier: Option<InvocationId>,
    ) -> Option<InvocationId> {
        let method_range = self.tokens[self.pos].range;
        self.pos += 2; // method name and opening parenthesis

        let mut args = Vec::new();
        let mut current: Option<TextRange> = None;
        let mut depth = 0usize;
        let close_end = loop {
            let token = self.tokens.get(self.pos)?;
            match token.kind {
                TokenKind::RParen if depth == 0 => {
                    self.pos += 1;
                    break token.range.end;
                }
                TokenKind::Comma if depth == 0 => {
                    self.flush_argument(&mut args, current.take());
                }
                _ => {
                    if token.kind == TokenKind::LParen {
                        depth += 1;
                    } else if token.kind == TokenKind::RParen {
                        depth -= 1;
                    }
                    current = Some(match current {
                        Some(range) => {
                            TextRange::new(range.start, token.range.end)
                        }
                        None => token.range,
                    });
                }
            }
            self.pos += 1;
        };
        self.flush_argument(&mut args, current);

        let id = InvocationId(self.invocations.len() as u32);
        self.invocations.push(Invocation {
            method: method_range.slice(self.text).to_owned(),
            method_range,
            receiver,
            args,
            range: TextRange::new(chain_start, close_end),
            qualifier,
            next: None,
        });
        Some(id)
    }

    fn flush_argument(
        &self,
        args: &mut Vec<ArgumentExpr>,
        range: Option<TextRange>,
    ) {
        if let Some(range) = range {
            args.push(ArgumentExpr {
                text: range.slice(self.text).to_owned(),
                range,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_methods(model: &SourceModel, root: InvocationId) -> Vec<String> {
        let mut methods = Vec::new();
        let mut current = Some(root);
        while let Some(id) = current {
            let call = model.get(id);
            methods.push(call.method.clone());
            current = call.next;
        }
        methods
    }

    #[test]
    fn parses_static_stubbing_chain() {
        let text = r#"Mockito.when(mock.greet()).thenReturn("a").thenReturn("b");"#;
        let model = parse_source(text);
        assert_eq!(model.roots().len(), 1);

        let root = model.get(model.roots()[0]);
        assert_eq!(root.method, "when");
        assert_eq!(root.receiver.as_deref(), Some("Mockito"));
        assert_eq!(root.args.len(), 1);
        assert_eq!(root.args[0].text, "mock.greet()");
        assert_eq!(root.range.slice(text), "Mockito.when(mock.greet())");

        assert_eq!(
            chain_methods(&model, model.roots()[0]),
            vec!["when", "thenReturn", "thenReturn"]
        );
    }

    #[test]
    fn call_range_extends_from_chain_start() {
        let text = "mock.a(1).b(2)";
        let model = parse_source(text);
        let root = model.get(model.roots()[0]);
        let second = model.get(root.next.unwrap());
        assert_eq!(second.range.slice(text), "mock.a(1).b(2)");
        // The delta between consecutive call ends is exactly `.b(2)`.
        assert_eq!(&text[root.range.end..second.range.end], ".b(2)");
    }

    #[test]
    fn splits_arguments_at_top_level_commas_only() {
        let text = r#"doReturn(pair(1, 2), "x,y", new Err("a", 3))"#;
        let model = parse_source(text);
        let call = model.get(model.roots()[0]);
        let args: Vec<_> =
            call.args.iter().map(|a| a.text.as_str()).collect();
        assert_eq!(args, vec!["pair(1, 2)", "\"x,y\"", "new Err(\"a\", 3)"]);
    }

    #[test]
    fn nested_calls_in_arguments_do_not_become_chains() {
        let model = parse_source("when(mock.greet().length()).thenReturn(1)");
        assert_eq!(model.roots().len(), 1);
        assert_eq!(model.invocation_count(), 2);
    }

    #[test]
    fn dotted_receiver_is_captured_whole() {
        let model = parse_source("org.mockito.Mockito.when(x).thenThrow(e)");
        let root = model.get(model.roots()[0]);
        assert_eq!(root.receiver.as_deref(), Some("org.mockito.Mockito"));
        assert_eq!(root.method, "when");
    }

    #[test]
    fn unbalanced_argument_list_keeps_earlier_calls() {
        let model = parse_source("mock.a(1).b(2).c(unclosed");
        assert_eq!(model.roots().len(), 1);
        assert_eq!(
            chain_methods(&model, model.roots()[0]),
            vec!["a", "b"]
        );
    }

    #[test]
    fn field_access_ends_the_chain() {
        let model = parse_source("mock.a(1).field.b(2)");
        // `.field` breaks the fluent chain; `b` starts over as a separate
        // chain rooted at the `field` receiver.
        assert_eq!(chain_methods(&model, model.roots()[0]), vec!["a"]);
        assert_eq!(model.roots().len(), 2);
    }

    #[test]
    fn surrounding_statements_are_skipped() {
        let text = "int x = 3; Mockito.when(a).thenReturn(x); return x;";
        let model = parse_source(text);
        let methods: Vec<_> = model
            .roots()
            .iter()
            .map(|&r| model.get(r).method.clone())
            .collect();
        assert!(methods.contains(&"when".to_owned()));
    }
}
