use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace0, multispace1},
    combinator::{map, map_res, opt, recognize},
    sequence::{delimited, preceded},
};
use storage::slot::node::Record;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Append(Record),
    Insert(Record),
    Remove { key: i64 },
    Search { key: i64 },
    List,
    Slots,
    Free,
}

pub fn parse_command(input: &str) -> anyhow::Result<Command> {
    let (remaining, cmd) =
        command(input).map_err(|e| anyhow::anyhow!("Parse error: {}", e))?;
    let remaining = remaining.trim();
    if !remaining.is_empty() {
        anyhow::bail!("Parse error: unexpected trailing input {:?}", remaining);
    }
    Ok(cmd)
}

fn command(input: &str) -> IResult<&str, Command> {
    preceded(
        multispace0,
        alt((
            append_command,
            insert_command,
            remove_command,
            search_command,
            map(tag_no_case("list"), |_| Command::List),
            map(tag_no_case("slots"), |_| Command::Slots),
            map(tag_no_case("free"), |_| Command::Free),
        )),
    )(input)
}

fn append_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("append")(input)?;
    let (input, rec) = record(input)?;
    Ok((input, Command::Append(rec)))
}

fn insert_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("insert")(input)?;
    let (input, rec) = record(input)?;
    Ok((input, Command::Insert(rec)))
}

fn remove_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("remove")(input)?;
    let (input, key) = preceded(multispace1, integer)(input)?;
    Ok((input, Command::Remove { key }))
}

fn search_command(input: &str) -> IResult<&str, Command> {
    let (input, _) = tag_no_case("search")(input)?;
    let (input, key) = preceded(multispace1, integer)(input)?;
    Ok((input, Command::Search { key }))
}

fn record(input: &str) -> IResult<&str, Record> {
    let (input, key) = preceded(multispace1, integer)(input)?;
    let (input, payload) = preceded(multispace1, payload)(input)?;
    Ok((input, Record::new(key, payload)))
}

fn integer(input: &str) -> IResult<&str, i64> {
    map_res(recognize(preceded(opt(char('-')), digit1)), str::parse)(input)
}

fn payload(input: &str) -> IResult<&str, String> {
    alt((quoted_payload, bare_payload))(input)
}

fn quoted_payload(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('\''), take_while(|c| c != '\''), char('\'')),
        |s: &str| s.to_string(),
    )(input)
}

fn bare_payload(input: &str) -> IResult<&str, String> {
    map(take_while1(|c: char| !c.is_whitespace()), |s: &str| {
        s.to_string()
    })(input)
}
