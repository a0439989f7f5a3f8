// Copyright 2022 Ryan Seipp
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Single-byte and small fixed-grammar parser primitives.
//! [IETF RFC 1945 Section 2.2](https://www.rfc-editor.org/rfc/rfc1945#section-2.2)

/// `CHAR = <any US-ASCII character (octets 0 - 127)>`
pub fn achar(input: &[u8]) -> Option<usize> {
    matches(input, |b| b <= 127)
}

/// `UPALPHA = <any US-ASCII uppercase letter "A".."Z">`
pub fn upalpha(input: &[u8]) -> Option<usize> {
    matches(input, |b| b.is_ascii_uppercase())
}

/// `LOALPHA = <any US-ASCII lowercase letter "a".."z">`
pub fn loalpha(input: &[u8]) -> Option<usize> {
    matches(input, |b| b.is_ascii_lowercase())
}

/// `ALPHA = UPALPHA | LOALPHA`
pub fn alpha(input: &[u8]) -> Option<usize> {
    matches(input, |b| b.is_ascii_alphabetic())
}

/// `DIGIT = <any US-ASCII digit "0".."9">`
pub fn digit(input: &[u8]) -> Option<usize> {
    matches(input, |b| b.is_ascii_digit())
}

/// `HEX = "A".."F" | "a".."f" | DIGIT`
pub fn hex(input: &[u8]) -> Option<usize> {
    matches(input, |b| b.is_ascii_hexdigit())
}

/// `CTL = <any US-ASCII control character (octets 0 - 31) and DEL (127)>`
pub fn ctl(input: &[u8]) -> Option<usize> {
    matches(input, |b| b < 32 || b == 127)
}

/// `CR = <US-ASCII CR, carriage return (13)>`
pub fn cr(input: &[u8]) -> Option<usize> {
    literal_byte(input, b'\r')
}

/// `LF = <US-ASCII LF, linefeed (10)>`
pub fn lf(input: &[u8]) -> Option<usize> {
    literal_byte(input, b'\n')
}

/// `SP = <US-ASCII SP, space (32)>`
pub fn sp(input: &[u8]) -> Option<usize> {
    literal_byte(input, b' ')
}

/// `HT = <US-ASCII HT, horizontal-tab (9)>`
pub fn ht(input: &[u8]) -> Option<usize> {
    literal_byte(input, b'\t')
}

/// `<"> = <US-ASCII double-quote mark (34)>`
pub fn dblqt(input: &[u8]) -> Option<usize> {
    literal_byte(input, b'"')
}

/// `CRLF = CR LF`
pub fn crlf(input: &[u8]) -> Option<usize> {
    let n = cr(input)?;
    let m = lf(&input[n..])?;
    Some(n + m)
}

/// `LWS = [CRLF] 1*( SP | HT )`
pub fn lws(input: &[u8]) -> Option<usize> {
    let mut consumed = crlf(input).unwrap_or(0);
    let start = consumed;
    loop {
        match sp(&input[consumed..]).or_else(|| ht(&input[consumed..])) {
            Some(n) => consumed += n,
            None => break,
        }
    }
    if consumed == start {
        None
    } else {
        Some(consumed)
    }
}

/// `TEXT = <any OCTET except CTLs, but including LWS>`
pub fn text(input: &[u8]) -> Option<usize> {
    lws(input).or_else(|| matches(input, |b| !(b < 32 || b == 127) || b == b'\t'))
}

/// `tspecials = "(" | ")" | "<" | ">" | "@" | "," | ";" | ":" | "\" | <"> | "/" | "[" | "]" | "?" | "=" | "{" | "}" | SP | HT`
pub fn tspecials(input: &[u8]) -> Option<usize> {
    matches(input, |b| {
        matches!(
            b,
            b'(' | b')'
                | b'<'
                | b'>'
                | b'@'
                | b','
                | b';'
                | b':'
                | b'\\'
                | b'"'
                | b'/'
                | b'['
                | b']'
                | b'?'
                | b'='
                | b'{'
                | b'}'
                | b' '
                | b'\t'
        )
    })
}

/// `token = 1*<any CHAR except CTLs or tspecials>`
pub fn token(input: &[u8]) -> Option<usize> {
    let mut consumed = 0;
    while consumed < input.len() {
        let b = input[consumed];
        if b > 127 || b < 32 || b == 127 || tspecials(&input[consumed..]).is_some() {
            break;
        }
        consumed += 1;
    }
    if consumed == 0 {
        None
    } else {
        Some(consumed)
    }
}

/// `qdtext = <any TEXT except <">>`
pub fn qdtext(input: &[u8]) -> Option<usize> {
    match input.first() {
        Some(&b'"') => None,
        Some(_) => text(input),
        None => None,
    }
}

/// `quoted-string = ( <"> *(qdtext) <"> )`
pub fn quoted_string(input: &[u8]) -> Option<usize> {
    let mut consumed = dblqt(input)?;
    while let Some(n) = qdtext(&input[consumed..]) {
        consumed += n;
    }
    consumed += dblqt(&input[consumed..])?;
    Some(consumed)
}

/// `word = token | quoted-string`
pub fn word(input: &[u8]) -> Option<usize> {
    token(input).or_else(|| quoted_string(input))
}

#[inline]
fn literal_byte(input: &[u8], b: u8) -> Option<usize> {
    matches!(input.first(), Some(&c) if c == b).then_some(1)
}

#[inline]
fn matches(input: &[u8], pred: impl Fn(u8) -> bool) -> Option<usize> {
    matches!(input.first(), Some(&b) if pred(b)).then_some(1)
}
