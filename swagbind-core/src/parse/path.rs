use std::borrow::Cow;

use miette::SourceSpan;
use winnow::{
    Parser,
    combinator::eof,
    error::{ContextError, ParseError},
};

/// Parses a path template, like `/users/{userId}/avatar.png`.
///
/// A template is a sequence of slash-delimited segments. Each segment is
/// made of literal text and `{name}` parameters, in any order.
pub fn parse(input: &str) -> Result<PathTemplate<'_>, BadPath> {
    (self::parser::template, eof)
        .map(|(segments, _)| PathTemplate(segments))
        .parse(input)
        .map_err(BadPath::from_parse_error)
}

/// A parsed path template.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathTemplate<'input>(Vec<PathSegment<'input>>);

impl<'input> PathTemplate<'input> {
    #[inline]
    pub fn segments(&self) -> &[PathSegment<'input>] {
        &self.0
    }

    /// Returns the names of all the parameters in this template,
    /// in the order they appear.
    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|segment| segment.fragments())
            .filter_map(|fragment| match fragment {
                PathFragment::Param(name) => Some(name.as_ref()),
                PathFragment::Literal(_) => None,
            })
    }

    /// Detaches this template from its input string.
    pub fn into_owned(self) -> PathTemplate<'static> {
        PathTemplate(self.0.into_iter().map(PathSegment::into_owned).collect())
    }
}

/// A path segment that contains zero or more fragments.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathSegment<'input>(Vec<PathFragment<'input>>);

impl<'input> PathSegment<'input> {
    #[inline]
    pub fn fragments(&self) -> &[PathFragment<'input>] {
        &self.0
    }

    fn into_owned(self) -> PathSegment<'static> {
        PathSegment(self.0.into_iter().map(PathFragment::into_owned).collect())
    }
}

/// A fragment within a path segment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PathFragment<'input> {
    /// Literal text, exactly as written in the template.
    Literal(Cow<'input, str>),
    /// Template parameter name.
    Param(Cow<'input, str>),
}

impl PathFragment<'_> {
    fn into_owned(self) -> PathFragment<'static> {
        match self {
            Self::Literal(text) => PathFragment::Literal(Cow::Owned(text.into_owned())),
            Self::Param(name) => PathFragment::Param(Cow::Owned(name.into_owned())),
        }
    }
}

mod parser {
    use super::*;

    use winnow::{
        Parser,
        combinator::{alt, preceded, repeat, terminated},
        token::take_while,
    };

    pub fn template<'a>(input: &mut &'a str) -> winnow::Result<Vec<PathSegment<'a>>> {
        repeat(1.., preceded('/', segment)).parse_next(input)
    }

    fn segment<'a>(input: &mut &'a str) -> winnow::Result<PathSegment<'a>> {
        repeat(0.., fragment).map(PathSegment).parse_next(input)
    }

    fn fragment<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        alt((param, literal)).parse_next(input)
    }

    fn param<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        preceded('{', terminated(take_while(1.., |c| c != '{' && c != '}' && c != '/'), '}'))
            .map(|name: &str| PathFragment::Param(Cow::Borrowed(name)))
            .parse_next(input)
    }

    /// Literal text runs up to the next slash or brace, and is kept
    /// as written.
    fn literal<'a>(input: &mut &'a str) -> winnow::Result<PathFragment<'a>> {
        take_while(1.., |c| !matches!(c, '{' | '}' | '/'))
            .map(|text: &str| PathFragment::Literal(Cow::Borrowed(text)))
            .parse_next(input)
    }
}

#[derive(Debug, miette::Diagnostic, thiserror::Error)]
#[error("malformed path template")]
pub struct BadPath {
    #[source_code]
    code: String,
    #[label("unexpected here")]
    span: SourceSpan,
}

impl BadPath {
    fn from_parse_error(error: ParseError<&str, ContextError>) -> Self {
        Self {
            code: (*error.input()).to_owned(),
            span: error.char_span().into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn lit(text: &str) -> PathFragment<'_> {
        PathFragment::Literal(text.into())
    }

    fn param(name: &str) -> PathFragment<'_> {
        PathFragment::Param(name.into())
    }

    #[test]
    fn test_root() {
        let template = parse("/").unwrap();
        assert_eq!(template.segments(), &[PathSegment::default()]);
    }

    #[test]
    fn test_literals_and_params() {
        let template = parse("/users/{userId}/posts/{postId}").unwrap();
        let fragments = template
            .segments()
            .iter()
            .map(|segment| segment.fragments())
            .collect::<Vec<_>>();
        assert_eq!(
            fragments,
            [
                &[lit("users")][..],
                &[param("userId")],
                &[lit("posts")],
                &[param("postId")],
            ]
        );
        assert_eq!(template.params().collect::<Vec<_>>(), ["userId", "postId"]);
    }

    #[test]
    fn test_mixed_segment() {
        let template = parse("/files/report-{id}.pdf").unwrap();
        assert_eq!(
            template.segments()[1].fragments(),
            &[lit("report-"), param("id"), lit(".pdf")]
        );
    }

    #[test]
    fn test_trailing_slash() {
        let template = parse("/users/").unwrap();
        assert_eq!(template.segments().len(), 2);
        assert_eq!(template.segments()[1], PathSegment::default());
    }

    #[test]
    fn test_keeps_percent_escapes() {
        let template = parse("/files/a%2Fb/{id}").unwrap();
        assert_eq!(template.segments()[1].fragments(), &[lit("a%2Fb")]);
        assert_eq!(template.params().collect::<Vec<_>>(), ["id"]);
    }

    #[test]
    fn test_empty_segments_and_unreserved_text() {
        let template = parse("/users//posts").unwrap();
        assert_eq!(
            template.segments(),
            &[
                PathSegment(vec![lit("users")]),
                PathSegment::default(),
                PathSegment(vec![lit("posts")]),
            ]
        );

        for path in ["/search|x", "/café", "/a b"] {
            let template = parse(path).unwrap();
            assert_eq!(template.segments()[0].fragments(), &[lit(&path[1..])]);
        }
    }

    #[test]
    fn test_into_owned() {
        let owned = {
            let input = String::from("/pets/{petId}");
            parse(&input).unwrap().into_owned()
        };
        assert_eq!(owned.params().collect::<Vec<_>>(), ["petId"]);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse("").is_err());
        assert!(parse("users").is_err());
        assert!(parse("/users/{a}}").is_err());
        assert!(parse("/users/{id").is_err());
        assert!(parse("/users/{}").is_err());
    }
}
