//! Grammar for backend type strings.
//!
//! Covers the shapes the supported dialects print:
//! `DOUBLE PRECISION`, `DECIMAL(10, 2)`, `TIMESTAMP(3) WITH TIME ZONE`,
//! `INTEGER[]`, `MAP(VARCHAR, INTEGER)`, `ARRAY<INT>`, `STRUCT(a INTEGER)`,
//! `STRUCT<a:INT>`, `geometry(Point,4326)`, `ENUM('a', 'b')`.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_while,
    character::complete::{alpha1, char, digit1, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded, terminated},
};

/// Parsed, dialect-independent shape of a type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSyntax {
    /// Upper-cased (possibly multi-word) name with optional parameters.
    Named { name: String, params: Vec<TypeParam> },
    /// `T[]` suffix.
    Array(Box<TypeSyntax>),
    /// `STRUCT(...)`, `STRUCT<...>` or `ROW(...)`.
    Struct(Vec<(String, TypeSyntax)>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeParam {
    Number(i64),
    Quoted(String),
    Type(TypeSyntax),
}

impl TypeSyntax {
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeSyntax::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn params(&self) -> &[TypeParam] {
        match self {
            TypeSyntax::Named { params, .. } => params,
            _ => &[],
        }
    }

    /// Integer parameters, in order.
    pub fn numbers(&self) -> Vec<i64> {
        self.params()
            .iter()
            .filter_map(|p| match p {
                TypeParam::Number(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Type parameters, in order.
    pub fn type_params(&self) -> Vec<&TypeSyntax> {
        self.params()
            .iter()
            .filter_map(|p| match p {
                TypeParam::Type(t) => Some(t),
                _ => None,
            })
            .collect()
    }
}

/// Parse a complete type string.
pub fn parse_type(input: &str) -> Result<TypeSyntax, String> {
    match all_consuming(terminated(type_expr, multispace0)).parse(input) {
        Ok((_, ty)) => Ok(ty),
        Err(e) => Err(format!("invalid type syntax: {}", e)),
    }
}

fn word(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, recognize(char('_')))),
        take_while(|c: char| c.is_alphanumeric() || c == '_'),
    ))
    .parse(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        delimited(char('"'), take_while(|c| c != '"'), char('"')),
        delimited(char('`'), take_while(|c| c != '`'), char('`')),
    ))
    .parse(input)
}

fn number(input: &str) -> IResult<&str, i64> {
    map_res(recognize((opt(char('-')), digit1)), |s: &str| s.parse::<i64>()).parse(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char(','), multispace0).parse(input)
}

fn param(input: &str) -> IResult<&str, TypeParam> {
    alt((
        map(number, TypeParam::Number),
        map(quoted, |s: &str| TypeParam::Quoted(s.to_string())),
        map(type_expr, TypeParam::Type),
    ))
    .parse(input)
}

fn bracketed<'a, O, F>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    F: FnMut(&'a str) -> IResult<&'a str, O> + Clone,
{
    move |input: &'a str| {
        alt((
            delimited(
                pair(char('('), multispace0),
                inner.clone(),
                pair(multispace0, char(')')),
            ),
            delimited(
                pair(char('<'), multispace0),
                inner.clone(),
                pair(multispace0, char('>')),
            ),
        ))
        .parse(input)
    }
}

fn params(input: &str) -> IResult<&str, Vec<TypeParam>> {
    bracketed(|i| separated_list1(comma, param).parse(i))(input)
}

fn struct_field(input: &str) -> IResult<&str, (String, TypeSyntax)> {
    let (input, name) = alt((quoted, word)).parse(input)?;
    let (input, _) = alt((
        recognize((multispace0, char(':'), multispace0)),
        multispace1,
    ))
    .parse(input)?;
    let (input, ty) = type_expr(input)?;
    Ok((input, (name.to_string(), ty)))
}

fn struct_fields(input: &str) -> IResult<&str, Vec<(String, TypeSyntax)>> {
    bracketed(|i| separated_list0(comma, struct_field).parse(i))(input)
}

fn array_suffix(input: &str) -> IResult<&str, ()> {
    map(
        preceded(multispace0, delimited(char('['), opt(digit1), char(']'))),
        |_| (),
    )
    .parse(input)
}

fn type_expr(input: &str) -> IResult<&str, TypeSyntax> {
    let (input, _) = multispace0(input)?;
    let (input, words) = separated_list1(multispace1, word).parse(input)?;
    let mut name = words.join(" ").to_ascii_uppercase();

    let (input, mut ty) = if name == "STRUCT" || name == "ROW" {
        let (input, fields) = preceded(multispace0, struct_fields).parse(input)?;
        (input, TypeSyntax::Struct(fields))
    } else {
        let (input, params) = opt(preceded(multispace0, params)).parse(input)?;
        // trailing words after parameters, e.g. `TIMESTAMP(3) WITH TIME ZONE`
        let (input, trailing) = if params.is_some() {
            many0(preceded(multispace1, word)).parse(input)?
        } else {
            (input, Vec::new())
        };
        for w in trailing {
            name.push(' ');
            name.push_str(&w.to_ascii_uppercase());
        }
        (
            input,
            TypeSyntax::Named {
                name,
                params: params.unwrap_or_default(),
            },
        )
    };

    let (input, suffixes) = many0(array_suffix).parse(input)?;
    for _ in suffixes {
        ty = TypeSyntax::Array(Box::new(ty));
    }
    Ok((input, ty))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, params: Vec<TypeParam>) -> TypeSyntax {
        TypeSyntax::Named {
            name: name.to_string(),
            params,
        }
    }

    #[test]
    fn test_multiword_names() {
        assert_eq!(parse_type("double precision").unwrap(), named("DOUBLE PRECISION", vec![]));
        assert_eq!(
            parse_type("timestamp(3) with time zone").unwrap(),
            named("TIMESTAMP WITH TIME ZONE", vec![TypeParam::Number(3)])
        );
        assert_eq!(
            parse_type("int(10) unsigned").unwrap(),
            named("INT UNSIGNED", vec![TypeParam::Number(10)])
        );
    }

    #[test]
    fn test_parameters() {
        assert_eq!(
            parse_type("DECIMAL(10, 2)").unwrap(),
            named("DECIMAL", vec![TypeParam::Number(10), TypeParam::Number(2)])
        );
        assert_eq!(
            parse_type("geometry(Point,4326)").unwrap(),
            named(
                "GEOMETRY",
                vec![TypeParam::Type(named("POINT", vec![])), TypeParam::Number(4326)]
            )
        );
        assert_eq!(
            parse_type("ENUM('a', 'b')").unwrap(),
            named(
                "ENUM",
                vec![TypeParam::Quoted("a".into()), TypeParam::Quoted("b".into())]
            )
        );
    }

    #[test]
    fn test_nested() {
        assert_eq!(
            parse_type("INTEGER[][]").unwrap(),
            TypeSyntax::Array(Box::new(TypeSyntax::Array(Box::new(named("INTEGER", vec![])))))
        );
        assert_eq!(
            parse_type("MAP<STRING,ARRAY<INT>>").unwrap(),
            named(
                "MAP",
                vec![
                    TypeParam::Type(named("STRING", vec![])),
                    TypeParam::Type(named("ARRAY", vec![TypeParam::Type(named("INT", vec![]))])),
                ]
            )
        );
        assert_eq!(
            parse_type("STRUCT(a INTEGER, \"b c\" VARCHAR)").unwrap(),
            TypeSyntax::Struct(vec![
                ("a".into(), named("INTEGER", vec![])),
                ("b c".into(), named("VARCHAR", vec![])),
            ])
        );
        assert_eq!(
            parse_type("STRUCT<a:INT,b:STRING>").unwrap(),
            TypeSyntax::Struct(vec![
                ("a".into(), named("INT", vec![])),
                ("b".into(), named("STRING", vec![])),
            ])
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_type("").is_err());
        assert!(parse_type("DECIMAL(10").is_err());
        assert!(parse_type("12abc").is_err());
    }
}
