// Copyright 2026 IAMServer Team
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

//! Policy pattern matcher.
//!
//! A pattern is a literal string unless it contains `<…>` delimiters, in
//! which case the text between each `<` and `>` pair is a regular expression
//! fragment (`<.*>` matches anything). Compiled patterns are anchored to the
//! whole candidate string and cached in a bounded LRU shared by all
//! evaluations.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use regex::Regex;

use crate::error::IamError;

/// Bound on the number of compiled patterns kept in the cache.
pub const DEFAULT_PATTERN_CACHE: usize = 512;

/// Matches candidate strings against policy pattern lists, caching compiled
/// regexes. Safe to share across threads.
pub struct RegexpMatcher {
    cache: Mutex<LruCache<String, Regex>>,
}

impl RegexpMatcher {
    /// Creates a matcher with the given cache capacity.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns whether any element of `haystack`, interpreted as a pattern,
    /// matches the whole of `needle`.
    ///
    /// # Errors
    ///
    /// Returns [`IamError::Matcher`] if a pattern fails to compile; the
    /// evaluation is aborted rather than silently treated as a non-match.
    pub fn matches(&self, haystack: &[String], needle: &str) -> Result<bool, IamError> {
        for pattern in haystack {
            // Patterns without delimiters are plain literals
            if !pattern.contains(['<', '>']) {
                if pattern == needle {
                    return Ok(true);
                }
                continue;
            }

            let regex = self.compiled(pattern)?;
            if regex.is_match(needle) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn compiled(&self, pattern: &str) -> Result<Regex, IamError> {
        let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(regex) = cache.get(pattern) {
            return Ok(regex.clone());
        }

        let regex = compile_anchored(pattern)?;
        cache.put(pattern.to_string(), regex.clone());
        Ok(regex)
    }

    #[cfg(test)]
    fn cached_patterns(&self) -> usize {
        self.cache.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for RegexpMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN_CACHE)
    }
}

/// Compiles a delimited pattern to a whole-string-anchored regex: text
/// outside `<…>` is escaped literally, text inside is kept verbatim.
fn compile_anchored(pattern: &str) -> Result<Regex, IamError> {
    let mut expr = String::with_capacity(pattern.len() + 4);
    expr.push('^');

    let mut rest = pattern;
    while let Some(start) = rest.find('<') {
        expr.push_str(&regex::escape(&rest[..start]));
        let after = &rest[start + 1..];
        let Some(end) = after.find('>') else {
            return Err(IamError::Matcher(format!(
                "unterminated '<' in pattern {pattern:?}"
            )));
        };
        expr.push('(');
        expr.push_str(&after[..end]);
        expr.push(')');
        rest = &after[end + 1..];
    }
    expr.push_str(&regex::escape(rest));
    expr.push('$');

    Regex::new(&expr).map_err(|e| IamError::Matcher(e.to_string()))
}
