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

//! Combinators that build bigger parsers out of smaller ones.
//!
//! Every parser in this crate shares one contract: given a byte slice, it returns
//! `Some(n)` for the number of bytes it matched at the *start* of the slice, or
//! `None` on mismatch. No parser allocates; matched spans are re-sliced by the
//! caller from the original input.

/// Object-safe alias for anything implementing the parser contract.
pub type Parser<'p> = dyn Fn(&[u8]) -> Option<usize> + 'p;

/// Matches each parser in order, each starting where the previous left off.
/// Fails (returning `None`) on the first mismatch.
pub fn sequence<'p>(parsers: Vec<Box<Parser<'p>>>) -> impl Fn(&[u8]) -> Option<usize> + 'p {
    move |input| {
        let mut consumed = 0;
        for parser in &parsers {
            let n = parser(&input[consumed..])?;
            consumed += n;
        }
        Some(consumed)
    }
}

/// Matches the first parser that succeeds; does not backtrack into a parser that
/// partially matched then failed deeper in a `sequence`.
pub fn choice<'p>(parsers: Vec<Box<Parser<'p>>>) -> impl Fn(&[u8]) -> Option<usize> + 'p {
    move |input| parsers.iter().find_map(|p| p(input))
}

/// Greedily matches `parser` between `min` and `max` times (`max = None` is
/// unbounded). Succeeds, returning total bytes consumed, iff at least `min`
/// repetitions matched.
pub fn many<'p>(
    parser: Box<Parser<'p>>,
    min: usize,
    max: Option<usize>,
) -> impl Fn(&[u8]) -> Option<usize> + 'p {
    move |input| {
        let mut consumed = 0;
        let mut count = 0;
        loop {
            if let Some(max) = max {
                if count >= max {
                    break;
                }
            }
            match parser(&input[consumed..]) {
                Some(0) => break, // zero-width match would loop forever
                Some(n) => {
                    consumed += n;
                    count += 1;
                }
                None => break,
            }
        }
        if count >= min {
            Some(consumed)
        } else {
            None
        }
    }
}

/// `many(parser, 0, Some(1))`.
pub fn optional<'p>(parser: Box<Parser<'p>>) -> impl Fn(&[u8]) -> Option<usize> + 'p {
    many(parser, 0, Some(1))
}

/// Matches the exact literal byte string.
pub fn literal(s: &'static [u8]) -> impl Fn(&[u8]) -> Option<usize> {
    move |input| {
        if input.len() >= s.len() && &input[..s.len()] == s {
            Some(s.len())
        } else {
            None
        }
    }
}

/// `*LWS element *( *LWS "," *LWS element )`, the comma-separated list production
/// used throughout RFC 2616's header grammar. `min` must be at least 1.
pub fn list<'p>(
    element: Box<Parser<'p>>,
    min: usize,
    max: Option<usize>,
) -> impl Fn(&[u8]) -> Option<usize> + 'p {
    move |input| {
        use crate::parser::primitives::lws;

        let mut consumed = 0;
        let mut count = 0;
        loop {
            if let Some(max) = max {
                if count >= max {
                    break;
                }
            }

            let mut probe = consumed;
            while let Some(n) = lws(&input[probe..]) {
                probe += n;
            }

            if count > 0 {
                // subsequent elements require a leading comma
                match input.get(probe) {
                    Some(b',') => probe += 1,
                    _ => break,
                }
                while let Some(n) = lws(&input[probe..]) {
                    probe += n;
                }
            }

            match element(&input[probe..]) {
                Some(n) => {
                    consumed = probe + n;
                    count += 1;
                }
                None => break,
            }
        }

        if count >= min {
            Some(consumed)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parser::primitives::{alpha, digit};

    #[test]
    fn sequence_matches_each_parser_in_order() {
        let p = sequence(vec![Box::new(alpha), Box::new(digit)]);
        assert_eq!(Some(2), p(b"a1"));
    }

    #[test]
    fn sequence_fails_on_first_mismatch() {
        let p = sequence(vec![Box::new(alpha), Box::new(digit)]);
        assert_eq!(None, p(b"ab"));
    }

    #[test]
    fn choice_returns_first_match() {
        let p = choice(vec![Box::new(digit), Box::new(alpha)]);
        assert_eq!(Some(1), p(b"a"));
    }

    #[test]
    fn many_requires_minimum_repetitions() {
        let p = many(Box::new(digit), 2, None);
        assert_eq!(None, p(b"1"));
        assert_eq!(Some(3), p(b"123"));
    }

    #[test]
    fn many_respects_maximum_repetitions() {
        let p = many(Box::new(digit), 0, Some(2));
        assert_eq!(Some(2), p(b"123"));
    }

    #[test]
    fn optional_matches_zero_or_one() {
        let p = optional(Box::new(digit));
        assert_eq!(Some(0), p(b"a"));
        assert_eq!(Some(1), p(b"1a"));
    }

    #[test]
    fn literal_matches_exact_bytes() {
        let p = literal(b"GET");
        assert_eq!(Some(3), p(b"GET /"));
        assert_eq!(None, p(b"GE"));
    }

    #[test]
    fn list_matches_comma_separated_elements() {
        let p = list(Box::new(alpha), 1, None);
        assert_eq!(Some(5), p(b"a,b,c"));
    }

    #[test]
    fn list_requires_minimum_elements() {
        let p = list(Box::new(alpha), 2, None);
        assert_eq!(None, p(b"a"));
    }
}
