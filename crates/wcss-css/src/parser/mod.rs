//! Style sheet parsing.
//!
//! The parser pulls tokens from [`CssTokenizer`] and alternates between two
//! modes. In selector mode tokens are simple selectors, combinators and
//! commas; they build selector chains in the [`SelectorTree`]. A `{` switches
//! to declaration mode, where each property name is followed by its value
//! tokens. The closing `}` copies the declarations to every selector grouped
//! with commas.
//!
//! Errors in one declaration are reported and skipped; the rest of the block
//! is still parsed.

pub mod charset;
pub mod shorthand;

use wcss_common::url::resolve_url;

use crate::context::CssContext;
use crate::diagnostics::{CssError, Diagnostic, ErrorCode};
use crate::properties::{COLLATION, Property, Shorthand};
use crate::selector::{SelectorId, SelectorNode, SelectorTree};
use crate::tokenizer::{CssTokenizer, TokenMode};
use crate::values::{css_url, omit_quotes};

/// The result of parsing one sheet.
#[derive(Debug, Clone)]
pub struct ParsedStylesheet {
    /// The rules.
    pub tree: SelectorTree,
    /// Absolute URLs of `@import`ed sheets whose media matched, in order.
    pub imports: Vec<String>,
}

/// Parse a sheet. `page_url` is the sheet's own URL for external sheets and
/// `None` for embedded ones.
pub fn parse_stylesheet(
    ctx: &mut CssContext,
    text: &str,
    page_url: Option<&str>,
) -> Result<ParsedStylesheet, CssError> {
    let mut parser = Parser {
        ctx,
        tree: SelectorTree::new(page_url.map(str::to_string)),
        imports: Vec::new(),
    };
    let mut tokenizer = CssTokenizer::new(text);
    parser.parse_rules(&mut tokenizer)?;
    Ok(ParsedStylesheet {
        tree: parser.tree,
        imports: parser.imports,
    })
}

/// Parse the contents of a `style` attribute. The declarations end up on
/// [`SelectorTree::BLOCK`].
pub fn parse_declaration_block(ctx: &mut CssContext, text: &str) -> Result<SelectorTree, CssError> {
    let block = format!("{{{text}}}");
    parse_stylesheet(ctx, &block, None).map(|parsed| parsed.tree)
}

/// Decode and parse a fetched sheet.
pub fn parse_external_stylesheet(
    ctx: &mut CssContext,
    bytes: &[u8],
    url: &str,
) -> Result<ParsedStylesheet, CssError> {
    let text = charset::decode_stylesheet(ctx, bytes)?;
    parse_stylesheet(ctx, &text, Some(url))
}

struct Parser<'a> {
    ctx: &'a mut CssContext,
    tree: SelectorTree,
    imports: Vec<String>,
}

/// Selector mode bookkeeping for the rule being read.
struct RuleState {
    /// Chain tail of the first selector of the group, or the block node.
    parent: SelectorId,
    /// The other selectors of a comma group.
    grouped: Vec<SelectorId>,
    /// Chain tail of the last grouped selector.
    last_grouped: Option<SelectorId>,
    selector_mode: bool,
    grouping: bool,
    child: bool,
    sibling: bool,
}

impl RuleState {
    const fn new() -> Self {
        Self {
            parent: SelectorTree::BLOCK,
            grouped: Vec::new(),
            last_grouped: None,
            selector_mode: true,
            grouping: false,
            child: false,
            sibling: false,
        }
    }
}

impl Parser<'_> {
    fn parse_rules(&mut self, tokenizer: &mut CssTokenizer) -> Result<(), CssError> {
        let mut state = RuleState::new();
        loop {
            let mode = if state.selector_mode {
                TokenMode::RULE
            } else {
                TokenMode::PROPERTY
            };
            let Some(token) = tokenizer.next_token(mode) else {
                break;
            };
            if token.contains("</style") {
                break;
            }

            match token.as_str() {
                "{" => {
                    state.selector_mode = false;
                    state.grouping = false;
                }
                "}" => {
                    self.close_rule(&state);
                    state = RuleState::new();
                }
                _ if state.selector_mode && token.starts_with('@') => {
                    self.at_rule(&token, tokenizer)?;
                }
                _ if state.selector_mode => self.selector_token(&token, &mut state)?,
                _ => self.declaration(&token, state.parent, tokenizer)?,
            }
        }
        Ok(())
    }

    /// Copy the declarations of the rule to each grouped selector and
    /// register those as rules of their own.
    fn close_rule(&mut self, state: &RuleState) {
        if state.parent == SelectorTree::BLOCK {
            return;
        }
        let values = self.tree.get(state.parent).values.clone();
        for &grouped in &state.grouped {
            self.tree.add_root(grouped);
            let terminal = self.tree.terminal(grouped);
            values.copy_into(&mut self.tree.get_mut(terminal).values);
        }
    }

    fn selector_token(&mut self, token: &str, state: &mut RuleState) -> Result<(), CssError> {
        match token {
            "," => {
                state.grouping = true;
                return Ok(());
            }
            ">" => {
                state.child = true;
                return Ok(());
            }
            "+" => {
                state.sibling = true;
                return Ok(());
            }
            _ => {}
        }

        let mut name = token;
        if let Some(rest) = name.strip_prefix(',') {
            name = rest;
            state.grouping = true;
        } else if let Some(rest) = name.strip_prefix('>') {
            name = rest;
            state.child = true;
        } else if let Some(rest) = name.strip_prefix('+') {
            name = rest;
            state.sibling = true;
        }

        let mut next_child = false;
        let mut next_sibling = false;
        if let Some(rest) = name.strip_suffix('>') {
            name = rest;
            next_child = true;
        } else if let Some(rest) = name.strip_suffix('+') {
            name = rest;
            next_sibling = true;
        }

        if state.grouping {
            match name.strip_suffix(',') {
                Some(rest) => name = rest,
                None => state.grouping = false,
            }
            let entry = self.new_selector(name)?;
            state.grouped.push(entry);
            state.last_grouped = Some(entry);
        } else {
            if let Some(rest) = name.strip_suffix(',') {
                name = rest;
                state.grouping = true;
            }
            let entry = self.new_selector(name)?;
            {
                let node = self.tree.get_mut(entry);
                node.descendant = !state.child;
                node.sibling = state.sibling;
            }
            match state.last_grouped {
                None => {
                    if state.parent == SelectorTree::BLOCK {
                        self.tree.add_root(entry);
                    } else {
                        self.tree.attach(state.parent, entry);
                    }
                    state.parent = entry;
                }
                Some(grouped) => {
                    self.tree.attach(grouped, entry);
                    state.last_grouped = Some(entry);
                }
            }
        }
        state.child = next_child;
        state.sibling = next_sibling;
        Ok(())
    }

    fn new_selector(&mut self, name: &str) -> Result<SelectorId, CssError> {
        let node = SelectorNode::new(name);
        if node.illegal {
            self.ctx.report(&Diagnostic::new(
                ErrorCode::MalformedSelector,
                name,
                format!("Selector '{name}' is malformed and will never match"),
            ))?;
        }
        Ok(self.tree.push(node))
    }

    fn declaration(
        &mut self,
        name: &str,
        target: SelectorId,
        tokenizer: &mut CssTokenizer,
    ) -> Result<(), CssError> {
        if let Some(shorthand) = Shorthand::from_name(name) {
            if crate::CSS2 || shorthand != Shorthand::Outline {
                return self.shorthand(shorthand, target, tokenizer);
            }
        }

        let property = Property::from_name(name).filter(|p| crate::CSS2 || !p.is_css2());
        let mode = if property.is_some_and(Property::reads_whole_value) {
            TokenMode::WHOLE_VALUE
        } else {
            TokenMode::VALUE_LIST
        };
        let value = tokenizer
            .next_token(mode)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        match property {
            Some(property) => {
                let _ = self.add_value(target, property, name, &value)?;
            }
            None => self.report_unsupported(target, name, &value)?,
        }
        while tokenizer.next_token(TokenMode::VALUE).is_some() {}
        Ok(())
    }

    fn shorthand(
        &mut self,
        shorthand: Shorthand,
        target: SelectorId,
        tokenizer: &mut CssTokenizer,
    ) -> Result<(), CssError> {
        let mut collected: Vec<String> = Vec::with_capacity(4);
        while let Some(value) = tokenizer.next_token(TokenMode::VALUE) {
            if shorthand.is_collatable() {
                if collected.len() < 4 {
                    collected.push(value);
                }
            } else {
                let _ = shorthand::add_shorthand_value(
                    &mut self.tree.get_mut(target).values,
                    shorthand,
                    &value,
                );
            }
        }

        if let Some(order) = collected.len().checked_sub(1).map(|i| COLLATION[i]) {
            for (value, sides) in collected.iter().zip(order) {
                for &side in *sides {
                    if let Some(property) = shorthand.side(side) {
                        let _ = self.add_value(target, property, property.name(), value)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Store a value, reporting an invalid one. Returns whether it was
    /// stored.
    fn add_value(
        &mut self,
        target: SelectorId,
        property: Property,
        name: &str,
        value: &str,
    ) -> Result<bool, CssError> {
        let node = self.tree.get_mut(target);
        if node.values.add(property, value).is_ok() {
            return Ok(true);
        }
        let subject = node.name.clone();
        self.ctx.report(
            &Diagnostic::new(
                ErrorCode::AttributeValueInvalid,
                subject.as_str(),
                format!(
                    "CSS Attribute '{name}' (Appeared in selector '{subject}') has an invalid value ({value})"
                ),
            )
            .with_attribute(name)
            .with_value(value),
        )?;
        Ok(false)
    }

    fn report_unsupported(&mut self, target: SelectorId, name: &str, value: &str) -> Result<(), CssError> {
        let subject = self.tree.get(target).name.clone();
        self.ctx.report(
            &Diagnostic::new(
                ErrorCode::AttributeNotSupported,
                subject.as_str(),
                format!("CSS Attribute '{name}' (Appeared in selector '{subject}') is not supported in WCSS."),
            )
            .with_attribute(name)
            .with_value(value),
        )
    }

    fn at_rule(&mut self, keyword: &str, tokenizer: &mut CssTokenizer) -> Result<(), CssError> {
        match keyword.to_ascii_lowercase().as_str() {
            "@import" => {
                if let Some(prelude) = tokenizer.next_token(TokenMode::PRELUDE) {
                    self.import(prelude.trim())?;
                }
            }
            "@media" => {
                let prelude = tokenizer.next_token(TokenMode::PRELUDE).unwrap_or_default();
                let (media, block) = if prelude == "{" {
                    (String::new(), tokenizer.read_block_body())
                } else {
                    (prelude.trim().to_string(), tokenizer.read_block())
                };
                if crate::CSS2 && self.ctx.media_matches(&media) {
                    self.parse_rules(&mut CssTokenizer::new(&block))?;
                }
            }
            "@charset" => {
                // Decoding happened before tokenizing.
                let _ = tokenizer.next_token(TokenMode::RULE);
            }
            _ => tokenizer.skip_statement(),
        }
        Ok(())
    }

    /// `@import url(x.css) handheld, tv`.
    fn import(&mut self, prelude: &str) -> Result<(), CssError> {
        let (target, media) = prelude.split_once(' ').unwrap_or((prelude, ""));
        if !self.ctx.media_matches(media) {
            return Ok(());
        }
        let href = css_url(target).unwrap_or_else(|| omit_quotes(target));
        let base = self.tree.page_url().or_else(|| self.ctx.base_url());
        match resolve_url(href, base) {
            Some(url) => self.imports.push(url),
            None => self.ctx.report(
                &Diagnostic::new(
                    ErrorCode::NoBaseUrl,
                    "@import",
                    format!(
                        "Ignoring CSS file referred in an @import rule ({href}), since there is no base URL to resolve it against"
                    ),
                )
                .with_value(href),
            )?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SelectorTree {
        parse_stylesheet(&mut CssContext::new(), text, None).unwrap().tree
    }

    #[test]
    fn test_simple_rule() {
        let tree = parse("p.warn { color: #00ff00; margin: 5px 10px }");
        assert_eq!(tree.roots().len(), 1);
        let node = tree.get(tree.roots()[0]);
        assert_eq!(node.class.as_deref(), Some("warn"));
        assert_eq!(node.values.get(Property::Color), Some(0x00ff00));
        assert_eq!(node.values.get(Property::MarginTop), Some(5));
        assert_eq!(node.values.get(Property::MarginLeft), Some(10));
    }

    #[test]
    fn test_grouping_copies_declarations() {
        let tree = parse("h1, h2 , h3 { color: red }");
        let tags: Vec<_> = tree
            .roots()
            .iter()
            .map(|&id| tree.get(id).tag.clone().unwrap())
            .collect();
        assert_eq!(tags, vec!["h1", "h2", "h3"]);
        for &id in tree.roots() {
            assert_eq!(tree.get(id).values.get(Property::Color), Some(0xff0000));
        }
    }

    #[test]
    fn test_combinators() {
        let tree = parse("div > p { color: red } ul li{color:blue} h1 + p{color:black}");
        let div = tree.roots()[0];
        let p = tree.get(div).child.unwrap();
        assert!(!tree.get(p).descendant);
        let ul = tree.roots()[1];
        let li = tree.get(ul).child.unwrap();
        assert!(tree.get(li).descendant);
        let h1 = tree.roots()[2];
        let sibling = tree.get(h1).child.unwrap();
        assert!(tree.get(sibling).sibling);
    }

    #[test]
    fn test_invalid_value_does_not_stop_block() {
        let tree = parse("p { color: nonsense; zoom: 2; background-color: blue }");
        let node = tree.get(tree.roots()[0]);
        assert_eq!(node.values.get(Property::Color), None);
        assert_eq!(node.values.get(Property::BackgroundColor), Some(0x0000ff));
    }

    #[test]
    fn test_inline_block() {
        let tree = parse_declaration_block(&mut CssContext::new(), "color: red; font-family: Arial, sans-serif").unwrap();
        let block = tree.get(SelectorTree::BLOCK);
        assert_eq!(block.values.get(Property::Color), Some(0xff0000));
        assert_eq!(block.values.raw(Property::FontFamily), Some("Arial, sans-serif"));
        assert!(tree.roots().is_empty());
    }

    #[test]
    fn test_import_needs_base() {
        let mut ctx = CssContext::new();
        let parsed = parse_stylesheet(&mut ctx, "@import url(a.css); p{}", Some("http://h/css/main.css")).unwrap();
        assert_eq!(parsed.imports, vec!["http://h/css/a.css".to_string()]);

        let parsed = parse_stylesheet(&mut ctx, "@import \"a.css\" print;", Some("http://h/")).unwrap();
        assert!(parsed.imports.is_empty());
    }
}
