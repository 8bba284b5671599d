//! Random username generation for anonymous chatters.
//!
//! Constructed once at server start and held in `AppState`; no hidden
//! process-wide state. Names alternate consonants and vowels so they read
//! as pronounceable fantasy names ("Mog", "Tavira").

use std::collections::HashSet;

use rand::Rng;

const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxyz";
const VOWELS: &[u8] = b"aeiou";

/// Issues unique pronounceable usernames and reclaims them on disconnect
#[derive(Debug, Default)]
pub struct UsernameGenerator {
    issued: HashSet<String>,
}

impl UsernameGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a name not currently held by any connected client
    pub fn next_name(&mut self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let name = random_name(&mut rng);
            if self.issued.insert(name.clone()) {
                return name;
            }
        }
    }

    /// Return a name to the pool.
    ///
    /// A no-op for names the generator never issued (user-chosen names).
    pub fn release(&mut self, name: &str) {
        self.issued.remove(name);
    }

    pub fn issued_count(&self) -> usize {
        self.issued.len()
    }
}

fn random_name(rng: &mut impl Rng) -> String {
    // Random length between 4-7, alternating consonant/vowel
    let length = rng.gen_range(4..=7);
    let mut name = String::with_capacity(length);

    for i in 0..length {
        let pool = if i % 2 == 0 { CONSONANTS } else { VOWELS };
        let ch = pool[rng.gen_range(0..pool.len())] as char;
        if i == 0 {
            name.push(ch.to_ascii_uppercase());
        } else {
            name.push(ch);
        }
    }

    name
}
