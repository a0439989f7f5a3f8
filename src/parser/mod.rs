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

//! A hand-rolled parser-combinator engine implementing the subset of
//! [IETF RFC 1945](https://www.rfc-editor.org/rfc/rfc1945) this server needs:
//! request-line, header, and a handful of field grammars, composed bottom-up from
//! single-byte primitives.

pub mod combinators;
pub mod grammar;
pub mod method;
pub mod primitives;
pub mod status;
pub mod tokenizer;
pub mod version;

pub use method::Method;
pub use status::Status;
pub use version::Version;
