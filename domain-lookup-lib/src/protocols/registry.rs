//! TLD routing table.
//!
//! Maps a domain suffix to the backends that can answer for it: the WHOIS
//! host, the RDAP base URL, and any query-template quirk the registry needs.
//! The built-in table is a fixed, versioned list; configuration may layer
//! overrides on top when an engine is constructed, after which the table is
//! read-only and shared behind an `Arc`.

use crate::utils::domain_suffixes;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Version tag of the built-in table, bumped whenever an entry changes.
pub const TLD_TABLE_VERSION: &str = "2025.06.1";

/// Placeholder replaced by the domain in a query template.
const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Routing information for one suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TldProfile {
    /// The suffix this profile covers ("com", "co.uk"); empty for the generic profile
    pub suffix: String,
    /// Registry WHOIS host, if one is known
    pub whois_host: Option<String>,
    /// RDAP base URL without the trailing `/domain/`
    pub rdap_base: Option<String>,
    /// Query sent on the first WHOIS attempt, with `{domain}` as placeholder
    pub query_template: String,
    /// The registry runs no public WHOIS service at all
    pub whois_absent: bool,
}

impl TldProfile {
    /// Profile used when no suffix matches: IANA referral and RDAP only.
    pub fn generic() -> Self {
        Self {
            suffix: String::new(),
            whois_host: None,
            rdap_base: None,
            query_template: DOMAIN_PLACEHOLDER.to_string(),
            whois_absent: false,
        }
    }

    /// Render the registry-specific query for `domain`.
    pub fn format_query(&self, domain: &str) -> String {
        self.query_template.replace(DOMAIN_PLACEHOLDER, domain)
    }

    pub fn is_generic(&self) -> bool {
        self.suffix.is_empty()
    }
}

/// A configuration-supplied change to one routing entry.
///
/// Every field is optional; unset fields keep the built-in value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TldOverride {
    pub whois: Option<String>,
    pub rdap: Option<String>,
    pub query_template: Option<String>,
    pub whois_absent: Option<bool>,
}

/// Suffix → profile lookup with longest-suffix matching.
#[derive(Debug, Clone)]
pub struct TldTable {
    profiles: HashMap<String, TldProfile>,
    generic: TldProfile,
}

lazy_static::lazy_static! {
    static ref BUILTIN_TABLE: Arc<TldTable> = Arc::new(TldTable::from_builtin_entries());
}

impl TldTable {
    /// The shared built-in table.
    pub fn builtin() -> Arc<TldTable> {
        Arc::clone(&BUILTIN_TABLE)
    }

    /// Find the profile for a normalized domain.
    ///
    /// The longest matching suffix wins, so `example.co.uk` resolves to the
    /// `co.uk` entry even though `uk` is also present. Never fails: unmatched
    /// domains receive the generic profile.
    pub fn resolve_profile(&self, domain: &str) -> &TldProfile {
        domain_suffixes(domain)
            .into_iter()
            .find_map(|suffix| self.profiles.get(suffix))
            .unwrap_or(&self.generic)
    }

    /// Exact lookup by suffix.
    pub fn get(&self, suffix: &str) -> Option<&TldProfile> {
        self.profiles.get(suffix)
    }

    /// Build a new table with `overrides` applied on top of this one.
    ///
    /// Unknown suffixes become new entries; known ones keep every field the
    /// override leaves unset.
    pub fn with_overrides(&self, overrides: &BTreeMap<String, TldOverride>) -> TldTable {
        let mut table = self.clone();

        for (suffix, entry) in overrides {
            let suffix = suffix.trim_matches('.').to_lowercase();
            if suffix.is_empty() {
                continue;
            }

            let profile = table
                .profiles
                .entry(suffix.clone())
                .or_insert_with(|| TldProfile {
                    suffix: suffix.clone(),
                    ..TldProfile::generic()
                });

            if let Some(host) = &entry.whois {
                profile.whois_host = Some(host.trim().to_lowercase()).filter(|h| !h.is_empty());
            }
            if let Some(base) = &entry.rdap {
                profile.rdap_base =
                    Some(base.trim().trim_end_matches('/').to_string()).filter(|b| !b.is_empty());
            }
            if let Some(template) = &entry.query_template {
                profile.query_template = template.clone();
            }
            if let Some(absent) = entry.whois_absent {
                profile.whois_absent = absent;
            }
        }

        table
    }

    /// Number of suffixes in the table.
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// All suffixes, sorted alphabetically.
    pub fn suffixes(&self) -> Vec<&str> {
        let mut suffixes: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        suffixes.sort_unstable();
        suffixes
    }

    fn from_builtin_entries() -> Self {
        let mut profiles: HashMap<String, TldProfile> = HashMap::new();

        for (suffix, host) in WHOIS_SERVERS {
            profiles
                .entry(suffix.to_string())
                .or_insert_with(|| TldProfile {
                    suffix: suffix.to_string(),
                    whois_host: Some(host.to_string()),
                    ..TldProfile::generic()
                });
        }

        for (suffix, base) in RDAP_BASES {
            let profile = profiles
                .entry(suffix.to_string())
                .or_insert_with(|| TldProfile {
                    suffix: suffix.to_string(),
                    ..TldProfile::generic()
                });
            profile.rdap_base = Some(base.to_string());
        }

        // Second-level suffixes share the RDAP service of their TLD
        let tld_rdap: HashMap<String, String> = profiles
            .values()
            .filter(|p| !p.suffix.contains('.'))
            .filter_map(|p| p.rdap_base.clone().map(|b| (p.suffix.clone(), b)))
            .collect();
        for profile in profiles.values_mut() {
            if profile.rdap_base.is_none() {
                if let Some((_, tld)) = profile.suffix.rsplit_once('.') {
                    profile.rdap_base = tld_rdap.get(tld).cloned();
                }
            }
        }

        for (suffix, template) in QUERY_TEMPLATES {
            if let Some(profile) = profiles.get_mut(*suffix) {
                profile.query_template = template.to_string();
            }
        }

        for suffix in WHOIS_ABSENT {
            if let Some(profile) = profiles.get_mut(*suffix) {
                profile.whois_host = None;
                profile.whois_absent = true;
            }
        }

        Self {
            profiles,
            generic: TldProfile::generic(),
        }
    }
}

impl Default for TldTable {
    fn default() -> Self {
        Self::from_builtin_entries()
    }
}

/// Registry-specific query templates.
const QUERY_TEMPLATES: &[(&str, &str)] = &[
    // Verisign thin registries answer with a list of matches unless asked for the domain object
    ("com", "domain {domain}"),
    ("net", "domain {domain}"),
    ("cc", "domain {domain}"),
    ("tv", "domain {domain}"),
    // DENIC only returns full data in this mode
    ("de", "-T dn,ace {domain}"),
    // JPRS answers in Japanese without the /e suffix
    ("jp", "{domain}/e"),
    ("co.jp", "{domain}/e"),
    ("ne.jp", "{domain}/e"),
    ("or.jp", "{domain}/e"),
    ("dk", "--show-handles {domain}"),
];

/// TLDs that publish no WHOIS service; RDAP is the only source.
const WHOIS_ABSENT: &[&str] = &["dev", "app", "page", "how", "soy", "new", "day", "foo"];

/// RDAP base URLs, without the `/domain/` path segment.
const RDAP_BASES: &[(&str, &str)] = &[
    // Generic TLDs
    ("com", "https://rdap.verisign.com/com/v1"),
    ("net", "https://rdap.verisign.com/net/v1"),
    ("org", "https://rdap.publicinterestregistry.org/rdap"),
    ("info", "https://rdap.identitydigital.services/rdap"),
    ("biz", "https://rdap.nic.biz"),
    ("top", "https://rdap.nic.top"),
    ("blog", "https://rdap.blog.fury.ca/rdap"),
    ("shop", "https://rdap.gmoregistry.net/rdap"),
    ("cloud", "https://rdap.registry.cloud/rdap"),
    // Google registry
    ("dev", "https://pubapi.registry.google/rdap"),
    ("app", "https://pubapi.registry.google/rdap"),
    ("page", "https://pubapi.registry.google/rdap"),
    ("how", "https://pubapi.registry.google/rdap"),
    ("soy", "https://pubapi.registry.google/rdap"),
    ("new", "https://pubapi.registry.google/rdap"),
    ("day", "https://pubapi.registry.google/rdap"),
    ("foo", "https://pubapi.registry.google/rdap"),
    // CentralNic
    ("xyz", "https://rdap.centralnic.com/xyz"),
    ("tech", "https://rdap.centralnic.com/tech"),
    ("online", "https://rdap.centralnic.com/online"),
    ("site", "https://rdap.centralnic.com/site"),
    ("website", "https://rdap.centralnic.com/website"),
    // Identity Digital / Donuts
    ("ai", "https://rdap.identitydigital.services/rdap"),
    ("io", "https://rdap.identitydigital.services/rdap"),
    ("me", "https://rdap.identitydigital.services/rdap"),
    ("zone", "https://rdap.identitydigital.services/rdap"),
    ("digital", "https://rdap.identitydigital.services/rdap"),
    ("software", "https://rdap.donuts.co/rdap"),
    ("engineer", "https://rdap.donuts.co/rdap"),
    ("agency", "https://rdap.donuts.co/rdap"),
    // Country codes
    ("us", "https://rdap.nic.us"),
    ("uk", "https://rdap.nominet.uk"),
    ("de", "https://rdap.denic.de"),
    ("ca", "https://rdap.ca.fury.ca/rdap"),
    ("au", "https://rdap.cctld.au/rdap"),
    ("fr", "https://rdap.nic.fr"),
    ("nl", "https://rdap.sidn.nl"),
    ("br", "https://rdap.registro.br"),
    ("in", "https://rdap.nixiregistry.in/rdap"),
    ("tv", "https://rdap.nic.tv"),
    ("cc", "https://tld-rdap.verisign.com/cc/v1"),
];

/// WHOIS hosts by suffix.
const WHOIS_SERVERS: &[(&str, &str)] = &[
    // Legacy and sponsored gTLDs
    ("com", "whois.verisign-grs.com"),
    ("net", "whois.verisign-grs.com"),
    ("org", "whois.pir.org"),
    ("info", "whois.afilias.net"),
    ("biz", "whois.biz"),
    ("name", "whois.nic.name"),
    ("pro", "whois.afilias.net"),
    ("mobi", "whois.afilias.net"),
    ("asia", "whois.nic.asia"),
    ("tel", "whois.nic.tel"),
    ("jobs", "whois.nic.jobs"),
    ("travel", "whois.nic.travel"),
    ("xxx", "whois.nic.xxx"),
    ("cat", "whois.nic.cat"),
    ("coop", "whois.nic.coop"),
    ("aero", "whois.aero"),
    ("museum", "whois.nic.museum"),
    ("post", "whois.dotpostregistry.net"),
    ("gov", "whois.dotgov.gov"),
    ("edu", "whois.educause.edu"),
    ("mil", "whois.nic.mil"),
    ("int", "whois.iana.org"),
    ("arpa", "whois.iana.org"),
    // New gTLDs
    ("xyz", "whois.nic.xyz"),
    ("top", "whois.nic.top"),
    ("site", "whois.nic.site"),
    ("online", "whois.nic.online"),
    ("tech", "whois.nic.tech"),
    ("cloud", "whois.nic.cloud"),
    ("host", "whois.nic.host"),
    ("website", "whois.nic.website"),
    ("space", "whois.nic.space"),
    ("link", "whois.uniregistry.net"),
    ("click", "whois.uniregistry.net"),
    ("digital", "whois.nic.digital"),
    ("network", "whois.nic.network"),
    ("systems", "whois.nic.systems"),
    ("software", "whois.nic.software"),
    ("computer", "whois.nic.computer"),
    ("codes", "whois.nic.codes"),
    ("domains", "whois.nic.domains"),
    ("hosting", "whois.nic.hosting"),
    ("data", "whois.nic.data"),
    ("shop", "whois.nic.shop"),
    ("store", "whois.nic.store"),
    ("club", "whois.nic.club"),
    ("vip", "whois.nic.vip"),
    ("win", "whois.nic.win"),
    ("wang", "whois.gtld.knet.cn"),
    ("work", "whois.nic.work"),
    ("company", "whois.nic.company"),
    ("business", "whois.nic.business"),
    ("agency", "whois.nic.agency"),
    ("group", "whois.nic.group"),
    ("center", "whois.nic.center"),
    ("solutions", "whois.nic.solutions"),
    ("services", "whois.nic.services"),
    ("consulting", "whois.nic.consulting"),
    ("management", "whois.nic.management"),
    ("partners", "whois.nic.partners"),
    ("ventures", "whois.nic.ventures"),
    ("capital", "whois.nic.capital"),
    ("holdings", "whois.nic.holdings"),
    ("global", "whois.nic.global"),
    ("international", "whois.nic.international"),
    ("limited", "whois.nic.limited"),
    ("ltd", "whois.nic.ltd"),
    ("inc", "whois.nic.inc"),
    ("gmbh", "whois.nic.gmbh"),
    ("llc", "whois.nic.llc"),
    ("sarl", "whois.nic.sarl"),
    ("finance", "whois.nic.finance"),
    ("financial", "whois.nic.financial"),
    ("money", "whois.nic.money"),
    ("fund", "whois.nic.fund"),
    ("investments", "whois.nic.investments"),
    ("exchange", "whois.nic.exchange"),
    ("market", "whois.nic.market"),
    ("trading", "whois.nic.trading"),
    ("cash", "whois.nic.cash"),
    ("bank", "whois.nic.bank"),
    ("insurance", "whois.nic.insurance"),
    ("credit", "whois.nic.credit"),
    ("loan", "whois.nic.loan"),
    ("loans", "whois.nic.loans"),
    ("tax", "whois.nic.tax"),
    ("blog", "whois.nic.blog"),
    ("news", "whois.nic.news"),
    ("media", "whois.nic.media"),
    ("live", "whois.nic.live"),
    ("video", "whois.nic.video"),
    ("photos", "whois.nic.photos"),
    ("pictures", "whois.nic.pictures"),
    ("gallery", "whois.nic.gallery"),
    ("graphics", "whois.nic.graphics"),
    ("design", "whois.nic.design"),
    ("art", "whois.nic.art"),
    ("studio", "whois.nic.studio"),
    ("music", "whois.nic.music"),
    ("audio", "whois.nic.audio"),
    ("games", "whois.nic.games"),
    ("game", "whois.nic.game"),
    ("play", "whois.nic.play"),
    ("chat", "whois.nic.chat"),
    ("social", "whois.nic.social"),
    ("community", "whois.nic.community"),
    ("fans", "whois.nic.fans"),
    ("fun", "whois.nic.fun"),
    ("lol", "whois.nic.lol"),
    ("life", "whois.nic.life"),
    ("world", "whois.nic.world"),
    ("today", "whois.nic.today"),
    ("city", "whois.nic.city"),
    ("zone", "whois.nic.zone"),
    ("place", "whois.nic.place"),
    ("email", "whois.nic.email"),
    ("support", "whois.nic.support"),
    ("help", "whois.nic.help"),
    ("guide", "whois.nic.guide"),
    ("tips", "whois.nic.tips"),
    ("wiki", "whois.nic.wiki"),
    ("plus", "whois.nic.plus"),
    ("express", "whois.nic.express"),
    ("direct", "whois.nic.direct"),
    ("delivery", "whois.nic.delivery"),
    ("academy", "whois.nic.academy"),
    ("education", "whois.nic.education"),
    ("school", "whois.nic.school"),
    ("college", "whois.nic.college"),
    ("university", "whois.nic.university"),
    ("institute", "whois.nic.institute"),
    ("training", "whois.nic.training"),
    ("courses", "whois.nic.courses"),
    ("legal", "whois.nic.legal"),
    ("lawyer", "whois.nic.lawyer"),
    ("attorney", "whois.nic.attorney"),
    ("law", "whois.nic.law"),
    ("doctor", "whois.nic.doctor"),
    ("dentist", "whois.nic.dentist"),
    ("clinic", "whois.nic.clinic"),
    ("healthcare", "whois.nic.healthcare"),
    ("hospital", "whois.nic.hospital"),
    ("pharmacy", "whois.nic.pharmacy"),
    ("fitness", "whois.nic.fitness"),
    ("yoga", "whois.nic.yoga"),
    ("property", "whois.nic.property"),
    ("properties", "whois.nic.properties"),
    ("realty", "whois.nic.realty"),
    ("estate", "whois.nic.estate"),
    ("land", "whois.nic.land"),
    ("house", "whois.nic.house"),
    ("homes", "whois.nic.homes"),
    ("apartments", "whois.nic.apartments"),
    ("restaurant", "whois.nic.restaurant"),
    ("bar", "whois.nic.bar"),
    ("pub", "whois.nic.pub"),
    ("cafe", "whois.nic.cafe"),
    ("coffee", "whois.nic.coffee"),
    ("pizza", "whois.nic.pizza"),
    ("beer", "whois.nic.beer"),
    ("wine", "whois.nic.wine"),
    ("kitchen", "whois.nic.kitchen"),
    ("recipes", "whois.nic.recipes"),
    ("flights", "whois.nic.flights"),
    ("holiday", "whois.nic.holiday"),
    ("vacation", "whois.nic.vacation"),
    ("cruises", "whois.nic.cruises"),
    ("tours", "whois.nic.tours"),
    ("wedding", "whois.nic.wedding"),
    ("party", "whois.nic.party"),
    ("events", "whois.nic.events"),
    ("tickets", "whois.nic.tickets"),
    ("dating", "whois.nic.dating"),
    ("sale", "whois.nic.sale"),
    ("deals", "whois.nic.deals"),
    ("discount", "whois.nic.discount"),
    ("coupons", "whois.nic.coupons"),
    ("bargains", "whois.nic.bargains"),
    ("cheap", "whois.nic.cheap"),
    ("best", "whois.nic.best"),
    ("bid", "whois.nic.bid"),
    ("auction", "whois.nic.auction"),
    // Country codes marketed as generics
    ("io", "whois.nic.io"),
    ("co", "whois.nic.co"),
    ("me", "whois.nic.me"),
    ("cc", "ccwhois.verisign-grs.com"),
    ("tv", "whois.nic.tv"),
    ("fm", "whois.nic.fm"),
    ("ws", "whois.website.ws"),
    ("la", "whois.nic.la"),
    ("pw", "whois.nic.pw"),
    ("ai", "whois.nic.ai"),
    ("gg", "whois.gg"),
    ("im", "whois.nic.im"),
    ("to", "whois.tonic.to"),
    ("am", "whois.amnic.net"),
    ("ly", "whois.nic.ly"),
    ("so", "whois.nic.so"),
    ("sh", "whois.nic.sh"),
    ("ac", "whois.nic.ac"),
    ("sx", "whois.sx"),
    ("nu", "whois.iis.nu"),
    ("gl", "whois.nic.gl"),
    ("is", "whois.isnic.is"),
    ("mu", "whois.nic.mu"),
    ("sc", "whois.nic.sc"),
    ("vc", "whois.nic.vc"),
    ("ag", "whois.nic.ag"),
    ("bz", "whois.belizenic.bz"),
    ("ms", "whois.nic.ms"),
    ("tc", "whois.nic.tc"),
    ("vg", "whois.nic.vg"),
    ("gd", "whois.nic.gd"),
    ("dm", "whois.nic.dm"),
    ("lc", "whois.nic.lc"),
    ("ht", "whois.nic.ht"),
    // Europe
    ("uk", "whois.nic.uk"),
    ("de", "whois.denic.de"),
    ("eu", "whois.eu"),
    ("fr", "whois.nic.fr"),
    ("nl", "whois.domain-registry.nl"),
    ("be", "whois.dns.be"),
    ("it", "whois.nic.it"),
    ("es", "whois.nic.es"),
    ("pl", "whois.dns.pl"),
    ("ru", "whois.tcinet.ru"),
    ("xn--p1ai", "whois.tcinet.ru"),
    ("ua", "whois.ua"),
    ("at", "whois.nic.at"),
    ("ch", "whois.nic.ch"),
    ("li", "whois.nic.li"),
    ("cz", "whois.nic.cz"),
    ("sk", "whois.sk-nic.sk"),
    ("hu", "whois.nic.hu"),
    ("dk", "whois.dk-hostmaster.dk"),
    ("fi", "whois.fi"),
    ("se", "whois.iis.se"),
    ("no", "whois.norid.no"),
    ("ie", "whois.iedr.ie"),
    ("pt", "whois.dns.pt"),
    ("gr", "whois.ics.forth.gr"),
    ("ro", "whois.rotld.ro"),
    ("bg", "whois.register.bg"),
    ("hr", "whois.dns.hr"),
    ("rs", "whois.rnids.rs"),
    ("si", "whois.register.si"),
    ("lt", "whois.domreg.lt"),
    ("lv", "whois.nic.lv"),
    ("ee", "whois.tld.ee"),
    ("by", "whois.cctld.by"),
    ("md", "whois.nic.md"),
    ("lu", "whois.dns.lu"),
    ("mc", "whois.nic.mc"),
    ("mt", "whois.nic.mt"),
    ("cy", "whois.nic.cy"),
    ("al", "whois.akep.al"),
    ("mk", "whois.marnet.mk"),
    ("ba", "whois.nic.ba"),
    // Asia and the Middle East
    ("cn", "whois.cnnic.cn"),
    ("jp", "whois.jprs.jp"),
    ("kr", "whois.kr"),
    ("tw", "whois.twnic.net.tw"),
    ("hk", "whois.hkirc.hk"),
    ("sg", "whois.sgnic.sg"),
    ("my", "whois.mynic.my"),
    ("id", "whois.pandi.or.id"),
    ("ph", "whois.dot.ph"),
    ("vn", "whois.vnnic.vn"),
    ("th", "whois.thnic.co.th"),
    ("in", "whois.inregistry.net"),
    ("ir", "whois.nic.ir"),
    ("pk", "whois.pknic.net.pk"),
    ("bd", "whois.btcl.net.bd"),
    ("np", "whois.mos.com.np"),
    ("lk", "whois.nic.lk"),
    ("mm", "whois.nic.mm"),
    ("kh", "whois.nic.kh"),
    ("mn", "whois.nic.mn"),
    ("kz", "whois.nic.kz"),
    ("uz", "whois.cctld.uz"),
    ("af", "whois.nic.af"),
    ("bt", "whois.nic.bt"),
    ("ae", "whois.aeda.net.ae"),
    ("sa", "whois.nic.net.sa"),
    ("il", "whois.isoc.org.il"),
    ("tr", "whois.nic.tr"),
    ("qa", "whois.registry.qa"),
    ("kw", "whois.nic.kw"),
    ("bh", "whois.nic.bh"),
    ("om", "whois.registry.om"),
    ("jo", "whois.nic.jo"),
    ("lb", "whois.lbdr.org.lb"),
    ("iq", "whois.cmc.iq"),
    ("ps", "whois.pnina.ps"),
    // Americas
    ("us", "whois.nic.us"),
    ("ca", "whois.cira.ca"),
    ("mx", "whois.mx"),
    ("br", "whois.registro.br"),
    ("ar", "whois.nic.ar"),
    ("cl", "whois.nic.cl"),
    ("ve", "whois.nic.ve"),
    ("pe", "whois.nic.pe"),
    ("ec", "whois.nic.ec"),
    ("bo", "whois.nic.bo"),
    ("py", "whois.nic.py"),
    ("uy", "whois.nic.org.uy"),
    ("cr", "whois.nic.cr"),
    ("pa", "whois.nic.pa"),
    ("gt", "whois.gt"),
    ("hn", "whois.nic.hn"),
    ("sv", "whois.svnet.org.sv"),
    ("ni", "whois.nic.ni"),
    ("do", "whois.nic.do"),
    ("pr", "whois.nic.pr"),
    ("jm", "whois.nic.jm"),
    ("tt", "whois.nic.tt"),
    ("cu", "whois.nic.cu"),
    ("ky", "whois.nic.ky"),
    ("bb", "whois.nic.bb"),
    ("bs", "whois.nic.bs"),
    // Oceania
    ("au", "whois.auda.org.au"),
    ("nz", "whois.srs.net.nz"),
    ("fj", "whois.nic.fj"),
    ("pg", "whois.nic.pg"),
    ("vu", "whois.nic.vu"),
    ("sb", "whois.nic.sb"),
    ("ck", "whois.nic.ck"),
    ("pf", "whois.nic.pf"),
    ("nc", "whois.nic.nc"),
    ("wf", "whois.nic.wf"),
    ("as", "whois.nic.as"),
    ("gu", "whois.nic.gu"),
    ("ki", "whois.nic.ki"),
    ("nr", "whois.nic.nr"),
    // Africa
    ("za", "whois.registry.net.za"),
    ("ci", "whois.nic.ci"),
    ("ng", "whois.nic.net.ng"),
    ("ke", "whois.kenic.or.ke"),
    ("gh", "whois.nic.gh"),
    ("tz", "whois.tznic.or.tz"),
    ("ug", "whois.co.ug"),
    ("ma", "whois.registre.ma"),
    ("eg", "whois.ripe.net"),
    ("tn", "whois.ati.tn"),
    ("dz", "whois.nic.dz"),
    ("sd", "whois.nic.sd"),
    ("et", "whois.nic.et"),
    ("rw", "whois.nic.rw"),
    ("zm", "whois.nic.zm"),
    ("zw", "whois.nic.zw"),
    ("bw", "whois.nic.bw"),
    ("na", "whois.na-nic.com.na"),
    ("mz", "whois.nic.mz"),
    ("ao", "whois.nic.ao"),
    ("cm", "whois.nic.cm"),
    ("sn", "whois.nic.sn"),
    ("ml", "whois.nic.ml"),
    ("bf", "whois.nic.bf"),
    ("ne", "whois.nic.ne"),
    ("cd", "whois.nic.cd"),
    ("cg", "whois.nic.cg"),
    ("ga", "whois.nic.ga"),
    ("gn", "whois.nic.gn"),
    ("re", "whois.nic.re"),
    ("mg", "whois.nic.mg"),
    ("cv", "whois.nic.cv"),
    // Second-level registrations
    ("co.uk", "whois.nic.uk"),
    ("org.uk", "whois.nic.uk"),
    ("me.uk", "whois.nic.uk"),
    ("ltd.uk", "whois.nic.uk"),
    ("plc.uk", "whois.nic.uk"),
    ("com.cn", "whois.cnnic.cn"),
    ("net.cn", "whois.cnnic.cn"),
    ("org.cn", "whois.cnnic.cn"),
    ("gov.cn", "whois.cnnic.cn"),
    ("com.au", "whois.auda.org.au"),
    ("net.au", "whois.auda.org.au"),
    ("org.au", "whois.auda.org.au"),
    ("co.nz", "whois.srs.net.nz"),
    ("net.nz", "whois.srs.net.nz"),
    ("org.nz", "whois.srs.net.nz"),
    ("co.jp", "whois.jprs.jp"),
    ("ne.jp", "whois.jprs.jp"),
    ("or.jp", "whois.jprs.jp"),
    ("co.kr", "whois.kr"),
    ("or.kr", "whois.kr"),
    ("com.br", "whois.registro.br"),
    ("net.br", "whois.registro.br"),
    ("org.br", "whois.registro.br"),
    ("com.mx", "whois.mx"),
    ("org.mx", "whois.mx"),
    ("com.tw", "whois.twnic.net.tw"),
    ("org.tw", "whois.twnic.net.tw"),
    ("com.hk", "whois.hkirc.hk"),
    ("org.hk", "whois.hkirc.hk"),
    ("com.sg", "whois.sgnic.sg"),
    ("org.sg", "whois.sgnic.sg"),
    ("co.za", "whois.registry.net.za"),
    ("org.za", "whois.registry.net.za"),
    ("net.za", "whois.registry.net.za"),
    ("com.ar", "whois.nic.ar"),
    ("org.ar", "whois.nic.ar"),
    ("in.th", "whois.thnic.co.th"),
    ("co.th", "whois.thnic.co.th"),
    ("com.my", "whois.mynic.my"),
    ("net.my", "whois.mynic.my"),
    ("org.my", "whois.mynic.my"),
    ("co.id", "whois.pandi.or.id"),
    ("web.id", "whois.pandi.or.id"),
    ("com.ph", "whois.dot.ph"),
    ("org.ph", "whois.dot.ph"),
    ("com.vn", "whois.vnnic.vn"),
    ("net.vn", "whois.vnnic.vn"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_size() {
        let table = TldTable::builtin();
        assert!(table.len() >= 300, "table has {} entries", table.len());
        assert!(!TLD_TABLE_VERSION.is_empty());
    }

    #[test]
    fn test_longest_suffix_wins() {
        let table = TldTable::builtin();

        let profile = table.resolve_profile("example.co.uk");
        assert_eq!(profile.suffix, "co.uk");
        assert_eq!(profile.whois_host.as_deref(), Some("whois.nic.uk"));

        let profile = table.resolve_profile("example.uk");
        assert_eq!(profile.suffix, "uk");

        let profile = table.resolve_profile("www.example.com.cn");
        assert_eq!(profile.suffix, "com.cn");
    }

    #[test]
    fn test_unknown_suffix_gets_generic_profile() {
        let table = TldTable::builtin();
        let profile = table.resolve_profile("nonexistent-xyz123.test");
        assert!(profile.is_generic());
        assert!(profile.whois_host.is_none());
        assert!(profile.rdap_base.is_none());
        assert!(!profile.whois_absent);
    }

    #[test]
    fn test_query_templates() {
        let table = TldTable::builtin();
        assert_eq!(
            table.resolve_profile("example.com").format_query("example.com"),
            "domain example.com"
        );
        assert_eq!(
            table.resolve_profile("example.de").format_query("example.de"),
            "-T dn,ace example.de"
        );
        assert_eq!(
            table.resolve_profile("example.co.jp").format_query("example.co.jp"),
            "example.co.jp/e"
        );
        assert_eq!(
            table.resolve_profile("example.dk").format_query("example.dk"),
            "--show-handles example.dk"
        );
        assert_eq!(
            table.resolve_profile("example.org").format_query("example.org"),
            "example.org"
        );
    }

    #[test]
    fn test_whois_absent_tlds() {
        let table = TldTable::builtin();
        for tld in ["dev", "app", "page", "how", "soy", "new", "day", "foo"] {
            let profile = table.get(tld).unwrap();
            assert!(profile.whois_absent, "{} should be RDAP-only", tld);
            assert!(profile.whois_host.is_none());
            assert!(profile.rdap_base.is_some());
        }
    }

    #[test]
    fn test_rdap_base_inherited_by_second_level() {
        let table = TldTable::builtin();
        assert_eq!(
            table.get("co.uk").unwrap().rdap_base.as_deref(),
            Some("https://rdap.nominet.uk")
        );
        assert!(table.get("com").unwrap().rdap_base.as_deref().unwrap().ends_with("/v1"));
        assert!(table
            .suffixes()
            .iter()
            .filter_map(|s| table.get(s).unwrap().rdap_base.as_deref())
            .all(|b| !b.ends_with('/') && !b.ends_with("/domain")));
    }

    #[test]
    fn test_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "test".to_string(),
            TldOverride {
                whois: Some("127.0.0.1".to_string()),
                ..Default::default()
            },
        );
        overrides.insert(
            "com".to_string(),
            TldOverride {
                query_template: Some("{domain}".to_string()),
                ..Default::default()
            },
        );

        let table = TldTable::builtin().with_overrides(&overrides);
        let test = table.resolve_profile("example.test");
        assert_eq!(test.suffix, "test");
        assert_eq!(test.whois_host.as_deref(), Some("127.0.0.1"));

        let com = table.resolve_profile("example.com");
        assert_eq!(com.format_query("example.com"), "example.com");
        assert_eq!(com.whois_host.as_deref(), Some("whois.verisign-grs.com"));

        // Built-in table is untouched
        assert!(TldTable::builtin().get("test").is_none());
    }

    #[test]
    fn test_suffixes_sorted() {
        let table = TldTable::builtin();
        let suffixes = table.suffixes();
        let mut sorted = suffixes.clone();
        sorted.sort_unstable();
        assert_eq!(suffixes, sorted);
        assert!(suffixes.contains(&"co.uk"));
    }
}
