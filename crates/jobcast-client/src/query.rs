use std::collections::HashSet;

use jobcast_core::error::AppError;
use jobcast_core::traits::Transport;
use scraper::{ElementRef, Html, Selector};
use sxd_document::Package;
use sxd_document::dom::{ChildOfElement, ChildOfRoot, Document as XmlDocument, Element as XmlElement};
use sxd_xpath::nodeset::Node as XmlNode;
use sxd_xpath::{Context, Factory, Value};

use crate::fetcher::DocumentFetcher;

/// Query layer over a fetched document.
///
/// Two query styles share one API surface: tag/attribute search for
/// regular markup, and XPath for markup where the data is only
/// reachable through predicates (e.g. the script tag whose text matches
/// a pattern). XPath results are re-parsed into a fresh fragment so the
/// caller can keep using the tag/attribute methods on the subtree.
pub struct DomQuery<'a> {
    document: &'a Html,
}

impl<'a> DomQuery<'a> {
    /// Borrow the fetcher's current document.
    ///
    /// Fails fast with [`AppError::NoDocument`] when nothing has been
    /// loaded yet.
    pub fn new<T: Transport>(fetcher: &'a DocumentFetcher<T>) -> Result<Self, AppError> {
        fetcher
            .document()
            .map(|document| Self { document })
            .ok_or(AppError::NoDocument)
    }

    /// Query a standalone document, e.g. a fragment returned by
    /// [`find_by_xpath`](Self::find_by_xpath).
    pub fn from_document(document: &'a Html) -> Self {
        Self { document }
    }

    /// Every element matching the tag name and ALL of the given
    /// attribute equalities (exact string match per attribute, no
    /// wildcarding).
    ///
    /// The result is set-like: duplicates are collapsed and callers
    /// must not rely on the ordering.
    pub fn find_all(
        &self,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<Vec<ElementRef<'a>>, AppError> {
        let selector = compile_selector(tag, attrs)?;
        let mut seen = HashSet::new();
        Ok(self
            .document
            .select(&selector)
            .filter(|element| seen.insert(element.id()))
            .collect())
    }

    /// First element matching the criteria, in document order.
    ///
    /// "Not found" is `Ok(None)`, never an error.
    pub fn find_first(
        &self,
        tag: &str,
        attrs: &[(&str, &str)],
    ) -> Result<Option<ElementRef<'a>>, AppError> {
        let selector = compile_selector(tag, attrs)?;
        Ok(self.document.select(&selector).next())
    }

    /// Evaluate an XPath expression against an XML view of the document
    /// and re-parse the FIRST match (document order) as a fragment.
    ///
    /// An expression that matches nothing is [`AppError::XPathNoMatch`];
    /// one that cannot be parsed, or that evaluates to a non-node value
    /// (e.g. `count(//div)`), is [`AppError::XPathError`].
    pub fn find_by_xpath(&self, expression: &str) -> Result<Html, AppError> {
        let package = to_xml_package(self.document);
        let xml = package.as_document();

        let xpath = Factory::new()
            .build(expression)
            .map_err(|e| AppError::XPathError(format!("'{expression}': {e}")))?
            .ok_or_else(|| AppError::XPathError(format!("'{expression}': empty expression")))?;

        let context = Context::new();
        let value = xpath
            .evaluate(&context, xml.root())
            .map_err(|e| AppError::XPathError(format!("'{expression}': {e}")))?;

        let nodes = match value {
            Value::Nodeset(nodes) => nodes,
            _ => {
                return Err(AppError::XPathError(format!(
                    "'{expression}' did not evaluate to a node-set"
                )));
            }
        };

        let first = nodes
            .document_order_first()
            .ok_or_else(|| AppError::XPathNoMatch(expression.to_string()))?;

        Ok(Html::parse_fragment(&serialize_node(first)))
    }
}

fn compile_selector(tag: &str, attrs: &[(&str, &str)]) -> Result<Selector, AppError> {
    let mut css = String::from(tag);
    for (name, value) in attrs {
        let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
        css.push_str(&format!("[{name}=\"{escaped}\"]"));
    }
    Selector::parse(&css).map_err(|e| AppError::InvalidSelector(format!("'{css}': {e}")))
}

// ---------------------------------------------------------------------------
// XML view
// ---------------------------------------------------------------------------
//
// XPath runs against an XML-compatible view of the parsed HTML. The view
// is built by converting the tree node-by-node instead of serializing and
// re-parsing, so HTML-only constructs (void elements, raw text in
// scripts) cannot produce a malformed XML document.

fn to_xml_package(document: &Html) -> Package {
    let package = Package::new();
    let xml = package.as_document();
    let root = convert_element(&xml, document.root_element());
    xml.root().append_child(root);
    package
}

fn convert_element<'d>(xml: &XmlDocument<'d>, source: ElementRef<'_>) -> XmlElement<'d> {
    let element = xml.create_element(source.value().name());
    for (name, value) in source.value().attrs() {
        // Namespace-prefixed attributes (xml:lang, xlink:href) do not
        // survive the XML view; nothing downstream queries them.
        if !name.contains(':') {
            element.set_attribute_value(name, value);
        }
    }

    for child in source.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            element.append_child(convert_element(xml, child_element));
        } else if let Some(text) = child.value().as_text() {
            element.append_child(xml.create_text(text));
        } else if let Some(comment) = child.value().as_comment() {
            element.append_child(xml.create_comment(comment));
        }
    }
    element
}

/// Serialize one matched node back to markup for fragment re-parsing.
fn serialize_node(node: XmlNode<'_>) -> String {
    let mut out = String::new();
    match node {
        XmlNode::Element(element) => write_element(&mut out, element),
        XmlNode::Text(text) => push_escaped(&mut out, text.text()),
        XmlNode::Attribute(attribute) => push_escaped(&mut out, attribute.value()),
        XmlNode::Root(root) => {
            for child in root.children() {
                if let ChildOfRoot::Element(element) = child {
                    write_element(&mut out, element);
                }
            }
        }
        _ => {}
    }
    out
}

fn write_element(out: &mut String, element: XmlElement<'_>) {
    let name = element.name().local_part();
    out.push('<');
    out.push_str(name);
    for attribute in element.attributes() {
        out.push(' ');
        out.push_str(attribute.name().local_part());
        out.push_str("=\"");
        push_escaped_attr(out, attribute.value());
        out.push('"');
    }
    out.push('>');

    for child in element.children() {
        match child {
            ChildOfElement::Element(e) => write_element(out, e),
            ChildOfElement::Text(t) => push_escaped(out, t.text()),
            _ => {}
        }
    }

    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobcast_core::testutil::MockTransport;
    use jobcast_core::traits::HttpResponse;

    const JOBS_PAGE: &str = r#"<html><body>
        <div class="job" id="j1"><h2>Cook</h2><p class="oras">Cluj</p><a href="/jobs/1">details</a></div>
        <div class="job" id="j2"><h2>Baker</h2><p class="oras">Iasi</p><a href="/jobs/2">details</a></div>
        <div class="job" id="j3"><h2>Waiter</h2><p class="oras">Oradea</p><a href="/jobs/3">details</a></div>
        <div class="footer">About us</div>
    </body></html>"#;

    fn loaded_fetcher(html: &str) -> DocumentFetcher<MockTransport> {
        let mut fetcher = DocumentFetcher::with_transport(MockTransport::new(html));
        fetcher.load_url("https://careers.testco.example/jobs").unwrap();
        fetcher
    }

    fn text_of(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_string()
    }

    #[test]
    fn find_all_counts_matching_tags() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        assert_eq!(query.find_all("div", &[("class", "job")]).unwrap().len(), 3);
        assert_eq!(query.find_all("div", &[]).unwrap().len(), 4);
        assert_eq!(query.find_all("table", &[]).unwrap().len(), 0);
    }

    #[test]
    fn find_all_attributes_combine_as_and() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let matches = query
            .find_all("div", &[("class", "job"), ("id", "j2")])
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert!(text_of(matches[0]).contains("Baker"));
    }

    #[test]
    fn find_first_returns_document_order_match() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let first = query.find_first("h2", &[]).unwrap().unwrap();
        assert_eq!(text_of(first), "Cook");
    }

    #[test]
    fn find_first_absent_is_ok_none() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        assert!(query.find_first("div", &[("class", "missing")]).unwrap().is_none());
        assert!(query.find_first("table", &[]).unwrap().is_none());
    }

    #[test]
    fn malformed_tag_is_invalid_selector() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let err = query.find_all("div[", &[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidSelector(_)));
    }

    #[test]
    fn no_document_fails_fast() {
        let fetcher = DocumentFetcher::with_transport(MockTransport::new(JOBS_PAGE));
        assert!(matches!(DomQuery::new(&fetcher), Err(AppError::NoDocument)));
    }

    #[test]
    fn xpath_first_match_becomes_queryable_fragment() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let fragment = query.find_by_xpath("//div[@class='job']").unwrap();
        let sub = DomQuery::from_document(&fragment);

        // First match in document order is j1; its subtree composes
        // with the tag/attribute API.
        let title = sub.find_first("h2", &[]).unwrap().unwrap();
        assert_eq!(text_of(title), "Cook");
        let city = sub.find_first("p", &[("class", "oras")]).unwrap().unwrap();
        assert_eq!(text_of(city), "Cluj");
    }

    #[test]
    fn xpath_text_predicate_reaches_script_data() {
        let page = r#"<html><body>
            <script>var other = 1;</script>
            <script>var vmCfg = {"PositionList": ["Cook"]};</script>
        </body></html>"#;
        let fetcher = loaded_fetcher(page);
        let query = DomQuery::new(&fetcher).unwrap();

        let fragment = query
            .find_by_xpath("//script[contains(text(), 'vmCfg')]")
            .unwrap();
        let text = fragment.root_element().text().collect::<String>();
        assert!(text.contains("PositionList"));
        assert!(!text.contains("var other"));
    }

    #[test]
    fn xpath_no_match_is_a_distinct_error() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let err = query.find_by_xpath("//section[@id='nope']").unwrap_err();
        assert!(matches!(err, AppError::XPathNoMatch(_)));
        assert!(err.is_no_match());
    }

    #[test]
    fn xpath_parse_failure_is_xpath_error() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let err = query.find_by_xpath("(").unwrap_err();
        assert!(matches!(err, AppError::XPathError(_)));
        assert!(!err.is_no_match());
    }

    #[test]
    fn xpath_non_nodeset_result_is_rejected() {
        let fetcher = loaded_fetcher(JOBS_PAGE);
        let query = DomQuery::new(&fetcher).unwrap();

        let err = query.find_by_xpath("count(//div)").unwrap_err();
        assert!(matches!(err, AppError::XPathError(_)));
    }

    #[test]
    fn reloaded_url_queries_see_only_the_new_document() {
        let page_a = r#"<html><body><div id="a">alpha</div></body></html>"#;
        let page_b = r#"<html><body><div id="b">beta</div></body></html>"#;
        let transport = MockTransport::with_responses(vec![
            Ok(HttpResponse::new(200, page_a.as_bytes().to_vec())),
            Ok(HttpResponse::new(200, page_b.as_bytes().to_vec())),
        ]);
        let mut fetcher = DocumentFetcher::with_transport(transport);

        fetcher.load_url("https://a.example/").unwrap();
        let found = DomQuery::new(&fetcher)
            .unwrap()
            .find_all("div", &[("id", "a")])
            .unwrap();
        assert_eq!(found.len(), 1);

        fetcher.load_url("https://b.example/").unwrap();
        let query = DomQuery::new(&fetcher).unwrap();
        assert!(query.find_all("div", &[("id", "a")]).unwrap().is_empty());
        assert_eq!(query.find_all("div", &[("id", "b")]).unwrap().len(), 1);
    }
}
