use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(i64),
    String(String),
}

// browsers post select values as strings ("category": "3"), so ids accept both
// a JSON number and a string holding one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "NumberOrString")]
pub struct Stri64(pub i64);

impl TryFrom<NumberOrString> for Stri64 {
    type Error = String;

    fn try_from(value: NumberOrString) -> Result<Self, Self::Error> {
        match value {
            NumberOrString::Number(v) => Ok(Stri64(v)),
            NumberOrString::String(s) => match s.trim().parse::<i64>() {
                Ok(v) => Ok(Stri64(v)),
                Err(_) => Err(format!("Wrong value {s}, can not parse to i64")),
            },
        }
    }
}
