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

//! RFC 1945 / RFC 2616 grammar productions, built out of the primitives and
//! combinators in this module. Each function follows the shared parser contract:
//! `Some(bytes consumed)` on match, `None` on mismatch.

use super::combinators::{choice, list, many, optional, sequence};
use super::primitives::{alpha, crlf, digit, lws, quoted_string, sp, token};

// ---------------------------------------------------------------- URI grammar

/// `safe = "$" | "-" | "_" | "." | "+"`
pub fn safe(input: &[u8]) -> Option<usize> {
    byte_in(input, b"$-_.+")
}

/// `extra = "!" | "*" | "'" | "(" | ")" | ","`
pub fn extra(input: &[u8]) -> Option<usize> {
    byte_in(input, b"!*'(),")
}

/// `reserved = ";" | "/" | "?" | ":" | "@" | "&" | "="`
pub fn reserved(input: &[u8]) -> Option<usize> {
    byte_in(input, b";/?:@&=")
}

/// `unsafe = CTL | SP | <"> | "#" | "%" | "<" | ">"`
pub fn unsafe_(input: &[u8]) -> Option<usize> {
    match input.first() {
        Some(&b) if b < 32 || b == 127 => Some(1),
        Some(&b) if matches!(b, b' ' | b'"' | b'#' | b'%' | b'<' | b'>') => Some(1),
        _ => None,
    }
}

/// `national = <any OCTET except ALPHA, DIGIT, reserved, extra, safe, unsafe>`
pub fn national(input: &[u8]) -> Option<usize> {
    let b = *input.first()?;
    let excluded = b.is_ascii_alphanumeric()
        || reserved(input).is_some()
        || extra(input).is_some()
        || safe(input).is_some()
        || unsafe_(input).is_some();
    (!excluded).then_some(1)
}

/// `unreserved = alpha | digit | safe | extra | national`
pub fn unreserved(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(alpha),
        Box::new(digit),
        Box::new(safe),
        Box::new(extra),
        Box::new(national),
    ])(input)
}

/// `escape = "%" hex hex`
pub fn escape(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(|i: &[u8]| byte_in(i, b"%")),
        Box::new(super::primitives::hex),
        Box::new(super::primitives::hex),
    ])(input)
}

/// `uchar = unreserved | escape`
pub fn uchar(input: &[u8]) -> Option<usize> {
    choice(vec![Box::new(unreserved), Box::new(escape)])(input)
}

/// `pchar = uchar | ":" | "@" | "&" | "="`
pub fn pchar(input: &[u8]) -> Option<usize> {
    choice(vec![Box::new(uchar), Box::new(|i: &[u8]| byte_in(i, b":@&="))])(input)
}

/// `fsegment = 1*pchar`
pub fn fsegment(input: &[u8]) -> Option<usize> {
    many(Box::new(pchar), 1, None)(input)
}

/// `segment = *pchar`
pub fn segment(input: &[u8]) -> Option<usize> {
    many(Box::new(pchar), 0, None)(input)
}

/// `path = fsegment *( "/" segment )`
pub fn path(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(fsegment),
        Box::new(many(
            Box::new(sequence(vec![
                Box::new(|i: &[u8]| byte_in(i, b"/")),
                Box::new(segment),
            ])),
            0,
            None,
        )),
    ])(input)
}

/// `param = *pchar`
pub fn param(input: &[u8]) -> Option<usize> {
    segment(input)
}

/// `params = param *( ";" param )`
pub fn params(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(param),
        Box::new(many(
            Box::new(sequence(vec![
                Box::new(|i: &[u8]| byte_in(i, b";")),
                Box::new(param),
            ])),
            0,
            None,
        )),
    ])(input)
}

/// `query = *uchar`
pub fn query(input: &[u8]) -> Option<usize> {
    many(Box::new(uchar), 0, None)(input)
}

/// `fragment = *uchar`
pub fn fragment(input: &[u8]) -> Option<usize> {
    many(Box::new(uchar), 0, None)(input)
}

/// `scheme = 1*( alpha | digit | "+" | "-" | "." )`
pub fn scheme(input: &[u8]) -> Option<usize> {
    many(
        Box::new(choice(vec![
            Box::new(alpha),
            Box::new(digit),
            Box::new(|i: &[u8]| byte_in(i, b"+-.")),
        ])),
        1,
        None,
    )(input)
}

/// `net_loc = *( pchar | ";" | "?" )`
pub fn net_loc(input: &[u8]) -> Option<usize> {
    many(
        Box::new(choice(vec![Box::new(pchar), Box::new(|i: &[u8]| byte_in(i, b";?"))])),
        0,
        None,
    )(input)
}

/// `rel_path = [ path ] [ ";" params ] [ "?" query ]`
pub fn rel_path(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(optional(Box::new(path))),
        Box::new(optional(Box::new(sequence(vec![
            Box::new(|i: &[u8]| byte_in(i, b";")),
            Box::new(params),
        ])))),
        Box::new(optional(Box::new(sequence(vec![
            Box::new(|i: &[u8]| byte_in(i, b"?")),
            Box::new(query),
        ])))),
    ])(input)
}

/// `net_path = "//" net_loc [ abs_path ]`
pub fn net_path(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"//")),
        Box::new(net_loc),
        Box::new(optional(Box::new(abs_path))),
    ])(input)
}

/// `abs_path = "/" rel_path`
pub fn abs_path(input: &[u8]) -> Option<usize> {
    sequence(vec![Box::new(|i: &[u8]| byte_in(i, b"/")), Box::new(rel_path)])(input)
}

/// `relative_uri = net_path | abs_path | rel_path`
pub fn relative_uri(input: &[u8]) -> Option<usize> {
    choice(vec![Box::new(net_path), Box::new(abs_path), Box::new(rel_path)])(input)
}

/// `absolute_uri = scheme ":" ( net_path | abs_path | rel_path )`
pub fn absolute_uri(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(scheme),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(choice(vec![
            Box::new(net_path),
            Box::new(abs_path),
            Box::new(rel_path),
        ])),
    ])(input)
}

/// `URI = absolute_uri | relative_uri`
pub fn uri(input: &[u8]) -> Option<usize> {
    choice(vec![Box::new(absolute_uri), Box::new(relative_uri)])(input)
}

/// `Request-URI = "*" | absolute_uri | abs_path | authority`
pub fn request_uri(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(|i: &[u8]| byte_in(i, b"*")),
        Box::new(absolute_uri),
        Box::new(abs_path),
        Box::new(net_loc),
    ])(input)
}

// --------------------------------------------------------- Method / Version

/// `Method = "GET" | "HEAD" | "POST" | extension-method`
pub fn method(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(super::combinators::literal(b"GET")),
        Box::new(super::combinators::literal(b"HEAD")),
        Box::new(super::combinators::literal(b"POST")),
        Box::new(extension_method),
    ])(input)
}

/// `extension-method = token`
pub fn extension_method(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `HTTP-Version = "HTTP" "/" 1*digit "." 1*digit`
pub fn http_version(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"HTTP/")),
        Box::new(many(Box::new(digit), 1, None)),
        Box::new(super::combinators::literal(b".")),
        Box::new(many(Box::new(digit), 1, None)),
    ])(input)
}

// -------------------------------------------------------------- Date/time

/// `wkday = "Mon" | "Tue" | "Wed" | "Thu" | "Fri" | "Sat" | "Sun"`
pub fn wkday(input: &[u8]) -> Option<usize> {
    choice(
        ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
            .iter()
            .map(|d| Box::new(super::combinators::literal(d.as_bytes())) as Box<super::combinators::Parser>)
            .collect(),
    )(input)
}

/// `weekday = "Monday" | "Tuesday" | ... | "Sunday"`
pub fn weekday(input: &[u8]) -> Option<usize> {
    choice(
        [
            "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
        ]
        .iter()
        .map(|d| Box::new(super::combinators::literal(d.as_bytes())) as Box<super::combinators::Parser>)
        .collect(),
    )(input)
}

/// `month = "Jan" | "Feb" | ... | "Dec"`
pub fn month(input: &[u8]) -> Option<usize> {
    choice(
        [
            "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
        ]
        .iter()
        .map(|d| Box::new(super::combinators::literal(d.as_bytes())) as Box<super::combinators::Parser>)
        .collect(),
    )(input)
}

/// `time = 2DIGIT ":" 2DIGIT ":" 2DIGIT`
pub fn time(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(many(Box::new(digit), 2, Some(2))),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(many(Box::new(digit), 2, Some(2))),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(many(Box::new(digit), 2, Some(2))),
    ])(input)
}

/// `date1 = 2DIGIT SP month SP 4DIGIT` (day month year, rfc1123 style)
pub fn date1(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(many(Box::new(digit), 2, Some(2))),
        Box::new(sp),
        Box::new(month),
        Box::new(sp),
        Box::new(many(Box::new(digit), 4, Some(4))),
    ])(input)
}

/// `date2 = 2DIGIT "-" month "-" 2DIGIT` (rfc850 style)
pub fn date2(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(many(Box::new(digit), 2, Some(2))),
        Box::new(|i: &[u8]| byte_in(i, b"-")),
        Box::new(month),
        Box::new(|i: &[u8]| byte_in(i, b"-")),
        Box::new(many(Box::new(digit), 2, Some(2))),
    ])(input)
}

/// `date3 = month SP ( 2DIGIT | ( SP 1DIGIT ))` (asctime style)
pub fn date3(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(month),
        Box::new(sp),
        Box::new(choice(vec![
            Box::new(many(Box::new(digit), 2, Some(2))),
            Box::new(sequence(vec![Box::new(sp), Box::new(many(Box::new(digit), 1, Some(1)))])),
        ])),
    ])(input)
}

/// `rfc1123_date = wkday "," SP date1 SP time SP "GMT"`
pub fn rfc1123_date(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(wkday),
        Box::new(|i: &[u8]| byte_in(i, b",")),
        Box::new(sp),
        Box::new(date1),
        Box::new(sp),
        Box::new(time),
        Box::new(sp),
        Box::new(super::combinators::literal(b"GMT")),
    ])(input)
}

/// `rfc850_date = weekday "," SP date2 SP time SP "GMT"`
pub fn rfc850_date(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(weekday),
        Box::new(|i: &[u8]| byte_in(i, b",")),
        Box::new(sp),
        Box::new(date2),
        Box::new(sp),
        Box::new(time),
        Box::new(sp),
        Box::new(super::combinators::literal(b"GMT")),
    ])(input)
}

/// `asctime_date = wkday SP date3 SP time SP 4DIGIT`
pub fn asctime_date(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(wkday),
        Box::new(sp),
        Box::new(date3),
        Box::new(sp),
        Box::new(time),
        Box::new(sp),
        Box::new(many(Box::new(digit), 4, Some(4))),
    ])(input)
}

/// `HTTP-date = rfc1123_date | rfc850_date | asctime_date`
pub fn http_date(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(rfc1123_date),
        Box::new(rfc850_date),
        Box::new(asctime_date),
    ])(input)
}

/// `date = http_date`
pub fn date(input: &[u8]) -> Option<usize> {
    http_date(input)
}

// ------------------------------------------------------------------ Headers

/// `field-name = token`
pub fn field_name(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `field-content = <the OCTETs making up the field-value>`
pub fn field_content(input: &[u8]) -> Option<usize> {
    many(
        Box::new(choice(vec![Box::new(token), Box::new(super::primitives::text)])),
        1,
        None,
    )(input)
}

/// `field-value = *( field-content | LWS )`
pub fn field_value(input: &[u8]) -> Option<usize> {
    many(Box::new(choice(vec![Box::new(field_content), Box::new(lws)])), 0, None)(input)
}

/// `HTTP-header = field-name ":" [ field-value ] CRLF`
pub fn http_header(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(field_name),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(optional(Box::new(field_value))),
        Box::new(crlf),
    ])(input)
}

/// `content-length = "Content-Length" ":" 1*DIGIT`
pub fn content_length(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Content-Length")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(many(Box::new(digit), 1, None)),
    ])(input)
}

/// `type = token`
pub fn type_(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `subtype = token`
pub fn subtype(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `attribute = token`
pub fn attribute(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `value = token | quoted-string`
pub fn value(input: &[u8]) -> Option<usize> {
    choice(vec![Box::new(token), Box::new(quoted_string)])(input)
}

/// `parameter = ";" attribute "=" value`
pub fn parameter(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(|i: &[u8]| byte_in(i, b";")),
        Box::new(attribute),
        Box::new(|i: &[u8]| byte_in(i, b"=")),
        Box::new(value),
    ])(input)
}

/// `media-type = type "/" subtype *( ";" parameter )`
pub fn media_type(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(type_),
        Box::new(|i: &[u8]| byte_in(i, b"/")),
        Box::new(subtype),
        Box::new(many(Box::new(parameter), 0, None)),
    ])(input)
}

/// `content-type = "Content-Type" ":" media-type`
pub fn content_type(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Content-Type")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(media_type),
    ])(input)
}

/// `content-coding = token`
pub fn content_coding(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `content-encoding = "Content-Encoding" ":" content-coding`
pub fn content_encoding(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Content-Encoding")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(content_coding),
    ])(input)
}

/// `Allow = "Allow" ":" [ list(Method, 0, None) ]`
pub fn allow(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Allow")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(optional(Box::new(list(Box::new(method), 1, None)))),
    ])(input)
}

/// `Expires = "Expires" ":" HTTP-date`
pub fn expires(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Expires")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(http_date),
    ])(input)
}

/// `Last-Modified = "Last-Modified" ":" HTTP-date`
pub fn last_modified(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Last-Modified")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(http_date),
    ])(input)
}

/// `extension-header = HTTP-header`
pub fn extension_header(input: &[u8]) -> Option<usize> {
    http_header(input)
}

/// `If-Modified-Since = "If-Modified-Since" ":" HTTP-date`
pub fn if_modified_since(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"If-Modified-Since")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(http_date),
    ])(input)
}

/// `Referer = "Referer" ":" ( absolute_uri | relative_uri )`
pub fn referer(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Referer")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(choice(vec![Box::new(absolute_uri), Box::new(relative_uri)])),
    ])(input)
}

/// `User-Agent = "User-Agent" ":" 1*( product | comment )`
pub fn user_agent(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"User-Agent")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(many(Box::new(choice(vec![Box::new(product), Box::new(comment)])), 1, None)),
    ])(input)
}

/// `product = token [ "/" product-version ]`
pub fn product(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(token),
        Box::new(optional(Box::new(sequence(vec![
            Box::new(|i: &[u8]| byte_in(i, b"/")),
            Box::new(product_version),
        ])))),
    ])(input)
}

/// `product-version = token`
pub fn product_version(input: &[u8]) -> Option<usize> {
    token(input)
}

/// `ctext = <any TEXT excluding "(" and ")">`
pub fn ctext(input: &[u8]) -> Option<usize> {
    match input.first() {
        Some(&b'(') | Some(&b')') => None,
        Some(_) => super::primitives::text(input),
        None => None,
    }
}

/// `comment = "(" *( ctext | comment ) ")"`
pub fn comment(input: &[u8]) -> Option<usize> {
    let mut consumed = byte_in(input, b"(")?;
    loop {
        if let Some(n) = ctext(&input[consumed..]) {
            consumed += n;
        } else if let Some(n) = comment(&input[consumed..]) {
            consumed += n;
        } else {
            break;
        }
    }
    consumed += byte_in(&input[consumed..], b")")?;
    Some(consumed)
}

/// `pragma-directive = "no-cache" | extension-pragma`
pub fn pragma_directive(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(super::combinators::literal(b"no-cache")),
        Box::new(extension_pragma),
    ])(input)
}

/// `extension-pragma = token [ "=" word ]`
pub fn extension_pragma(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(token),
        Box::new(optional(Box::new(sequence(vec![
            Box::new(|i: &[u8]| byte_in(i, b"=")),
            Box::new(super::primitives::word),
        ])))),
    ])(input)
}

/// `Pragma = "Pragma" ":" list(pragma-directive, 1, None)`
pub fn pragma(input: &[u8]) -> Option<usize> {
    sequence(vec![
        Box::new(super::combinators::literal(b"Pragma")),
        Box::new(|i: &[u8]| byte_in(i, b":")),
        Box::new(optional(Box::new(sp))),
        Box::new(list(Box::new(pragma_directive), 1, None)),
    ])(input)
}

/// `general-header = Date | Pragma`
pub fn general_header(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(sequence(vec![
            Box::new(super::combinators::literal(b"Date")),
            Box::new(|i: &[u8]| byte_in(i, b":")),
            Box::new(optional(Box::new(sp))),
            Box::new(http_date),
        ])),
        Box::new(pragma),
    ])(input)
}

/// `request-header = Allow | If-Modified-Since | Referer | User-Agent`
pub fn request_header(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(allow),
        Box::new(if_modified_since),
        Box::new(referer),
        Box::new(user_agent),
    ])(input)
}

/// `entity-header = Content-Encoding | Content-Length | Content-Type | Expires | Last-Modified | extension-header`
pub fn entity_header(input: &[u8]) -> Option<usize> {
    choice(vec![
        Box::new(content_encoding),
        Box::new(content_length),
        Box::new(content_type),
        Box::new(expires),
        Box::new(last_modified),
        Box::new(extension_header),
    ])(input)
}

#[inline]
fn byte_in(input: &[u8], set: &[u8]) -> Option<usize> {
    matches!(input.first(), Some(b) if set.contains(b)).then_some(1)
}
