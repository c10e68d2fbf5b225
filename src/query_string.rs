use std::collections::HashMap;

#[derive(PartialEq, Debug)]
pub struct QueryString {
    items: HashMap<String, String>,
}

/// Raw `page` parameter, before it is checked against the page count.
#[derive(PartialEq, Debug, Clone, Copy)]
pub enum PageParam {
    Missing,
    NotAnInteger,
    Number(i64),
}

impl PageParam {
    pub fn parse(val: &str) -> Self {
        match val.trim().parse::<i64>() {
            Ok(n) => PageParam::Number(n),
            Err(_) => PageParam::NotAnInteger,
        }
    }
}

impl QueryString {
    pub fn from(buf: &str) -> Self {
        let vs: Vec<(String, String)> = serde_urlencoded::from_str(buf).unwrap_or_else(|_| vec![]);
        let items: HashMap<String, String> = vs.into_iter().collect();

        QueryString {
            items,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(|v| v.as_str())
    }

    pub fn get_page(&self) -> PageParam {
        match self.items.get("page") {
            None => PageParam::Missing,
            Some(val) => PageParam::parse(val),
        }
    }
}
