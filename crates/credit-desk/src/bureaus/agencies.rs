//! Static directory of consumer reporting agencies and their freeze portals.

use serde::Serialize;

/// Primary agencies are the three major bureaus; secondary agencies cover
/// banking, utility, and public-record reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AgencyTier {
    Primary,
    Secondary,
}

/// A consumer reporting agency entry for the freeze directory.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Agency {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: AgencyTier,
    pub freeze_url: &'static str,
    pub description: &'static str,
}

pub const AGENCY_DIRECTORY: &[Agency] = &[
    Agency {
        id: "equifax",
        name: "Equifax",
        tier: AgencyTier::Primary,
        freeze_url: "https://www.equifax.com/personal/credit-report-services/credit-freeze/",
        description: "One of the three major credit reporting agencies.",
    },
    Agency {
        id: "experian",
        name: "Experian",
        tier: AgencyTier::Primary,
        freeze_url: "https://www.experian.com/freeze/center.html",
        description: "One of the three major credit reporting agencies.",
    },
    Agency {
        id: "transunion",
        name: "TransUnion",
        tier: AgencyTier::Primary,
        freeze_url: "https://www.transunion.com/credit-freeze",
        description: "One of the three major credit reporting agencies.",
    },
    Agency {
        id: "chexsystems",
        name: "ChexSystems",
        tier: AgencyTier::Secondary,
        freeze_url: "https://www.chexsystems.com/security-freeze/place-freeze",
        description: "Tracks banking history; critical for opening new bank accounts.",
    },
    Agency {
        id: "innovis",
        name: "Innovis",
        tier: AgencyTier::Secondary,
        freeze_url: "https://www.innovis.com/securityFreeze/index",
        description: "A supplementary credit bureau often checked by lenders.",
    },
    Agency {
        id: "nctue",
        name: "NCTUE",
        tier: AgencyTier::Secondary,
        freeze_url: "https://www.nctue.com/consumers",
        description: "National Consumer Telecom & Utilities Exchange. Tracks utility/telecom history.",
    },
    Agency {
        id: "lexisnexis",
        name: "LexisNexis",
        tier: AgencyTier::Secondary,
        freeze_url: "https://consumer.risk.lexisnexis.com/freeze",
        description: "Aggregates public records and insurance data.",
    },
];
