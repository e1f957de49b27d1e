//! Metadata of the clinical data a simulation is compared against

use std::fmt;

use serde_derive::Serialize;

macro_rules! metadata_enum {
    ($(#[$meta:meta])* $name:ident { $( $variant:ident => $label:literal, )* }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $( #[serde(rename = $label)] $variant, )*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[ $( $name::$variant, )* ];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $label, )*
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

metadata_enum!(Tissue {
    Plasma => "plasma",
    Serum => "serum",
    Urine => "urine",
    Feces => "feces",
});

metadata_enum!(Route {
    Po => "po",
    Iv => "iv",
});

metadata_enum!(Dosing {
    Single => "single",
    Multiple => "multiple",
    ConstantInfusion => "infusion",
});

metadata_enum!(
    /// Pharmaceutical form of the application
    ApplicationForm {
        Tablet => "tablet",
        Solution => "solution",
        Capsule => "capsule",
        Mixed => "mixed",
        NotReported => "not reported",
    }
);

metadata_enum!(Health {
    Healthy => "healthy",
    T2dm => "type 2 diabetes mellitus",
    Hypertension => "hypertension",
    Cirrhosis => "cirrhosis",
    RenalImpairment => "renal impairment",
    HepaticImpairment => "hepatic impairment",
    Chf => "congestive heart failure",
    T2dmRenalImpairment => "T2DM & renal impairment",
    T2dmHepaticImpairment => "T2DM & hepatic impairment",
});

metadata_enum!(Fasting {
    NotReported => "not reported",
    Fasted => "fasted",
    Fed => "fed",
});

metadata_enum!(Coadministration {
    None => "none",
    Cyclosporine => "cyclosporine",
    Evogliptin => "evogliptin",
    Hydrochlorothiazide => "hydrochlorothiazide",
    Linagliptin => "linagliptin",
    Lobeglitazone => "lobeglitazone",
    Metformin => "metformin",
    Probenecid => "probenecid",
    Rifampicin => "rifampicin",
    Sitagliptin => "sitagliptin",
    Torasemide => "torasemide",
    Warfarin => "warfarin",
});

/// Metadata of a mapping between a simulated observable and clinical data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingMetaData {
    pub tissue: Tissue,
    pub route: Route,
    pub application_form: ApplicationForm,
    pub dosing: Dosing,
    pub health: Health,
    pub fasting: Fasting,
    pub coadministration: Coadministration,
    pub outlier: bool,
}

impl MappingMetaData {
    /// Oral tablet without coadministration, the most common setting
    pub fn new(tissue: Tissue, dosing: Dosing, health: Health, fasting: Fasting) -> Self {
        MappingMetaData {
            tissue,
            route: Route::Po,
            application_form: ApplicationForm::Tablet,
            dosing,
            health,
            fasting,
            coadministration: Coadministration::None,
            outlier: false,
        }
    }

    pub fn application_form(mut self, application_form: ApplicationForm) -> Self {
        self.application_form = application_form;
        self
    }

    pub fn coadministration(mut self, coadministration: Coadministration) -> Self {
        self.coadministration = coadministration;
        self
    }

    pub fn outlier(mut self, outlier: bool) -> Self {
        self.outlier = outlier;
        self
    }

    pub const HEADER: [&'static str; 8] = [
        "tissue",
        "route",
        "application_form",
        "dosing",
        "health",
        "fasting",
        "coadministration",
        "outlier",
    ];

    pub fn record(&self) -> [String; 8] {
        [
            self.tissue.to_string(),
            self.route.to_string(),
            self.application_form.to_string(),
            self.dosing.to_string(),
            self.health.to_string(),
            self.fasting.to_string(),
            self.coadministration.to_string(),
            self.outlier.to_string(),
        ]
    }
}

/// Tissue of the data compared to an observable
pub fn tissue(observable_id: &str) -> Tissue {
    if observable_id.starts_with("Afeces") {
        Tissue::Feces
    } else if observable_id.starts_with("Aurine") || observable_id.starts_with("KI__") {
        Tissue::Urine
    } else {
        Tissue::Plasma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(Health::T2dmRenalImpairment.to_string(), "T2DM & renal impairment");
        assert_eq!(ApplicationForm::NotReported.as_str(), "not reported");
        assert_eq!(Coadministration::ALL.len(), 12);
        assert_eq!(
            serde_json::to_string(&Dosing::ConstantInfusion).unwrap(),
            "\"infusion\""
        );
    }

    #[test]
    fn tissue_from_observable() {
        assert_eq!(tissue("[Cve_emp]"), Tissue::Plasma);
        assert_eq!(tissue("Aurine_emptot"), Tissue::Urine);
        assert_eq!(tissue("KI__UGE"), Tissue::Urine);
        assert_eq!(tissue("Afeces_eg"), Tissue::Feces);
    }

    #[test]
    fn builder() {
        let metadata = MappingMetaData::new(Tissue::Plasma, Dosing::Single, Health::Healthy, Fasting::Fed)
            .coadministration(Coadministration::Warfarin)
            .outlier(true);
        assert_eq!(metadata.route, Route::Po);
        assert_eq!(metadata.record()[6], "warfarin");
        assert_eq!(metadata.record()[7], "true");
    }
}
