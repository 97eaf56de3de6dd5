//! Synthetic dataset for `--demo` and for exercising the UI without a record
//! service. Deterministic: the same records every run, spread over the last
//! thirty days.

use crate::memory::MemoryStore;
use chrono::{DateTime, Duration, Utc};
use snatch_core::types::{Credential, SystemRecord};
use std::time::Duration as StdDuration;

const CREDENTIALS: u64 = 1_250;
const SYSTEMS: u64 = 240;

// (domain, login path)
const SITES: &[(&str, &str)] = &[
    ("accounts.google.com", "/signin"),
    ("login.live.com", "/login.srf"),
    ("www.paypal.com", "/signin"),
    ("www.amazon.com", "/ap/signin"),
    ("www.facebook.com", "/login"),
    ("twitter.com", "/i/flow/login"),
    ("appleid.apple.com", "/sign-in"),
    ("github.com", "/session"),
    ("discord.com", "/login"),
    ("steamcommunity.com", "/login/home"),
    ("www.netflix.com", "/login"),
    ("portal.acme-corp.example", "/sso"),
    ("mail.proton.me", "/login"),
    ("www.roblox.com", "/login"),
    ("binance.com", "/en/login"),
];

const SOFTWARE: &[&str] = &["Google Chrome", "Microsoft Edge", "Mozilla Firefox", "Opera GX", "Brave"];

// Weights: RedLine 35%, Vidar 20%, Raccoon 20%, Mars 10%, Lumma 10%, unknown 5%
const STEALERS: &[(u64, Option<&str>)] = &[
    (35, Some("RedLine")),
    (20, Some("Vidar")),
    (20, Some("Raccoon")),
    (10, Some("Mars")),
    (10, Some("Lumma")),
    (5, None),
];

const FIRST: &[&str] = &["alex", "maria", "chen", "olga", "dmitri", "sara", "juan", "fatima", "li", "noah", "emma", "yusuf"];
const LAST: &[&str] = &["smith", "garcia", "wang", "ivanova", "kowalski", "nguyen", "silva", "khan", "müller", "rossi"];
const MAIL: &[&str] = &["gmail.com", "outlook.com", "yahoo.com", "proton.me", "mail.ru"];

const COUNTRIES: &[&str] = &["US", "BR", "IN", "DE", "RU", "VN", "ID", "TR", "FR", "PL", "MX", "UA"];

/// The demo store, optionally slowed down to make loading states visible.
pub fn store(latency: StdDuration) -> MemoryStore {
    let now = Utc::now();
    MemoryStore::new(credentials(now), systems(now)).with_latency(latency)
}

/// Cheap deterministic mixing so neighbouring ids don't look alike.
fn mix(i: u64, salt: u64) -> u64 {
    let mut x = i.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ salt.wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x ^= x >> 31;
    x = x.wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 29)
}

fn pick<T: Copy>(items: &[T], i: u64, salt: u64) -> T {
    items[(mix(i, salt) % items.len() as u64) as usize]
}

fn stealer(i: u64) -> Option<&'static str> {
    let mut slot = mix(i, 7) % 100;
    for (weight, name) in STEALERS {
        if slot < *weight {
            return *name;
        }
        slot -= weight;
    }
    None
}

fn spread(now: DateTime<Utc>, i: u64, total: u64) -> DateTime<Utc> {
    let span_secs: i64 = 30 * 24 * 3600;
    let step = span_secs / total as i64;
    now - Duration::seconds((total - i) as i64 * step)
}

fn upload_id(i: u64) -> String {
    // ~40 records per archive
    format!("upl-{:05}", mix(i / 40, 3) % 100_000)
}

fn credentials(now: DateTime<Utc>) -> Vec<Credential> {
    (0..CREDENTIALS)
        .map(|i| {
            let (site, path) = pick(SITES, i, 1);
            let first = pick(FIRST, i, 2);
            let last = pick(LAST, i, 4);
            let mail = pick(MAIL, i, 5);
            let email_style = mix(i, 6) % 3 != 0;

            let (username, local_part, email_domain) = if email_style {
                let local = format!("{first}.{last}{}", mix(i, 8) % 100);
                (format!("{local}@{mail}"), Some(local), Some(mail.to_string()))
            } else {
                (format!("{first}_{last}"), None, None)
            };

            let password = match mix(i, 9) % 4 {
                0 => format!("{first}{}", 1980 + mix(i, 10) % 30),
                1 => format!("{}!{}", capitalize(last), mix(i, 11) % 1000),
                2 => "Qwerty123!".to_string(),
                _ => format!("{:x}", mix(i, 12) % 0xFFFF_FFFF),
            };

            Credential {
                id: i as i64 + 1,
                software: Some(pick(SOFTWARE, i, 13).to_string()),
                host: Some(format!("https://{site}{path}")),
                username: Some(username),
                password: Some(password),
                domain: Some(site.to_string()),
                local_part,
                email_domain,
                filepath: Some(format!("Passwords/{}/Default/Login Data", pick(SOFTWARE, i, 13))),
                stealer_name: stealer(i).map(String::from),
                upload_id: upload_id(i),
                created_at: spread(now, i, CREDENTIALS),
            }
        })
        .collect()
}

fn systems(now: DateTime<Utc>) -> Vec<SystemRecord> {
    (0..SYSTEMS)
        .map(|i| {
            let first = pick(FIRST, i, 20);
            // Leave some identifying fields out so the completeness score varies.
            let have = mix(i, 21) % 16;
            let field = |bit: u64, value: String| ((have & bit) != 0).then_some(value);

            SystemRecord {
                id: i as i64 + 1,
                machine_id: field(1, format!("{:08X}-{:04X}", mix(i, 22) as u32, mix(i, 23) as u16)),
                computer_name: field(2, format!("DESKTOP-{:07X}", mix(i, 24) % 0xFFF_FFFF)),
                hardware_id: field(4, format!("{:032X}", mix(i, 25) as u128 * 0x1_0000_0001)),
                machine_user: Some(first.to_string()),
                ip_address: field(
                    8,
                    format!(
                        "{}.{}.{}.{}",
                        mix(i, 26) % 223 + 1,
                        mix(i, 27) % 256,
                        mix(i, 28) % 256,
                        mix(i, 29) % 254 + 1
                    ),
                ),
                country: Some(pick(COUNTRIES, i, 30).to_string()),
                log_date: Some(spread(now, i, SYSTEMS).format("%d.%m.%Y %H:%M:%S").to_string()),
                upload_id: upload_id(i * 5),
                created_at: spread(now, i, SYSTEMS),
            }
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
