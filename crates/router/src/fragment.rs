#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    raw: String,
    path: String,
    query: Vec<(String, String)>,
    trailing: Option<String>,
}

impl Fragment {
    pub fn parse(raw: &str) -> Self {
        let Some(rest) = raw.strip_prefix("#/") else {
            return Self {
                raw: raw.to_string(),
                path: "/".to_string(),
                query: Vec::new(),
                trailing: None,
            };
        };

        let (route, trailing) = match rest.split_once('#') {
            Some((route, trailing)) => (route, Some(trailing.to_string())),
            None => (rest, None),
        };
        let (path, query) = match route.split_once('?') {
            Some((path, query)) => (path, parse_query(query)),
            None => (route, Vec::new()),
        };

        Self {
            raw: raw.to_string(),
            path: format!("/{path}"),
            query,
            trailing,
        }
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter(|segment| !segment.is_empty())
    }

    pub fn is_home(&self) -> bool {
        self.path == "/"
    }
}

pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(key), form_decode(value))
        })
        .collect()
}

pub fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", form_encode(key), form_encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn form_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'*' | b'-' | b'.' | b'_' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}

fn form_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' if i + 2 < bytes.len() => {
                let high = (bytes[i + 1] as char).to_digit(16);
                let low = (bytes[i + 2] as char).to_digit(16);
                if let (Some(high), Some(low)) = (high, low) {
                    out.push(((high << 4) + low) as u8);
                    i += 3;
                    continue;
                }
                out.push(b'%');
            }
            other => out.push(other),
        }
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
