//! Static record corpora used across harnesses.
//!
//! Small enough to reason about by hand: every count asserted in a harness
//! can be checked against the tables below.

use super::builders::{CredentialBuilder, SystemBuilder};
use snatch_core::{Credential, SystemRecord};

/// Nine credentials. Newest first by id: 9 is the most recent.
///
/// | id | domain              | username               | stealer  |
/// |----|---------------------|------------------------|----------|
/// | 1  | www.paypal.com      | john@gmail.com         | RedLine  |
/// | 2  | www.paypal.com      | maria@outlook.com      | Raccoon  |
/// | 3  | github.com          | john_dev               | Vidar    |
/// | 4  | login.live.com      | john@outlook.com       | Lumma    |
/// | 5  | portal.acme.example | j.smith@acme.example   | -        |
/// | 6  | www.amazon.com      | olga@mail.ru           | Mars     |
/// | 7  | discord.com         | gamer42                | RedLine  |
/// | 8  | accounts.google.com | maria@gmail.com        | Vidar    |
/// | 9  | www.paypal.com      | chen@proton.me         | Lumma    |
pub fn credentials() -> Vec<Credential> {
    vec![
        CredentialBuilder::new(1).domain("www.paypal.com").username("john@gmail.com").password("hunter2").software("Google Chrome").stealer("RedLine").build(),
        CredentialBuilder::new(2).domain("www.paypal.com").username("maria@outlook.com").password("Maria1984").software("Microsoft Edge").stealer("Raccoon").build(),
        CredentialBuilder::new(3).domain("github.com").username("john_dev").password("ghp-secret").software("Mozilla Firefox").stealer("Vidar").build(),
        CredentialBuilder::new(4).domain("login.live.com").username("john@outlook.com").password("Qwerty123!").software("Microsoft Edge").stealer("Lumma").build(),
        CredentialBuilder::new(5).domain("portal.acme.example").username("j.smith@acme.example").password("Winter2025").software("Google Chrome").build(),
        CredentialBuilder::new(6).domain("www.amazon.com").username("olga@mail.ru").password("olga1990").software("Opera GX").stealer("Mars").build(),
        CredentialBuilder::new(7).domain("discord.com").username("gamer42").password("letmein").software("Opera GX").stealer("RedLine").build(),
        CredentialBuilder::new(8).domain("accounts.google.com").username("maria@gmail.com").password("Maria1984").software("Google Chrome").stealer("Vidar").build(),
        CredentialBuilder::new(9).domain("www.paypal.com").username("chen@proton.me").password("c8f1e2").software("Brave").stealer("Lumma").build(),
    ]
}

/// Five systems with varying completeness.
///
/// | id | computer        | ip           | country | identifying fields |
/// |----|-----------------|--------------|---------|----------------|
/// | 1  | DESKTOP-AB12CD  | 185.220.1.7  | US      | 4 → High       |
/// | 2  | LAPTOP-MARIA    | 177.12.9.40  | BR      | 3 → High       |
/// | 3  | DESKTOP-9QX     | -            | BR      | 2 → Medium     |
/// | 4  | -               | 10.0.0.12    | DE      | 1 → Low        |
/// | 5  | WIN-SRV01       | 203.0.113.9  | US      | 2 → Medium     |
pub fn systems() -> Vec<SystemRecord> {
    vec![
        SystemBuilder::new(1).computer("DESKTOP-AB12CD").user("alex").ip("185.220.1.7").country("US").hwid("HWID-1").machine_id("M-1").build(),
        SystemBuilder::new(2).computer("LAPTOP-MARIA").user("maria").ip("177.12.9.40").country("BR").hwid("HWID-2").build(),
        SystemBuilder::new(3).computer("DESKTOP-9QX").user("joao").country("BR").machine_id("M-3").build(),
        SystemBuilder::new(4).ip("10.0.0.12").country("DE").build(),
        SystemBuilder::new(5).computer("WIN-SRV01").user("administrator").ip("203.0.113.9").country("US").build(),
    ]
}
