//! C7: BOM Projector (§4.7): a pure function from catalog dependency
//! records to bill-of-materials entries. No I/O, no fallible paths.

use toml::value::Datetime;

use crate::types::{Checksum, Dependency};

#[derive(Debug, Clone, PartialEq)]
pub struct BomEntry {
    pub name: String,
    pub version: String,
    pub uri: String,
    pub checksum: Checksum,
    pub source_checksum: Option<Checksum>,
    pub cpe: Option<String>,
    pub purl: Option<String>,
    pub licenses: Option<Vec<String>>,
    pub deprecation_date: Option<Datetime>,
}

/// Project each dependency record into a BOM entry, preserving input order.
pub fn generate_bill_of_materials(deps: &[Dependency]) -> Vec<BomEntry> {
    deps.iter().map(project_one).collect()
}

fn project_one(dep: &Dependency) -> BomEntry {
    BomEntry {
        name: dep.name.clone().unwrap_or_else(|| dep.id.clone()),
        version: dep.version.clone(),
        uri: dep.uri.clone(),
        checksum: dep.effective_checksum().unwrap_or(Checksum::Unknown {
            algorithm: "unknown".to_string(),
            hex: String::new(),
        }),
        source_checksum: dep.effective_source_checksum(),
        // `cpe` takes precedence over the legacy `cpes` list.
        cpe: dep.cpe.clone().or_else(|| {
            dep.cpes
                .as_ref()
                .and_then(|list| list.first().cloned())
        }),
        purl: dep.purl.clone(),
        licenses: dep.licenses.clone(),
        deprecation_date: dep.deprecation_date.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(overrides: impl FnOnce(&mut Dependency)) -> Dependency {
        let mut d = Dependency {
            id: "x".into(),
            name: None,
            version: "1.2.3".into(),
            stacks: vec!["*".into()],
            uri: "https://example.com/x.tgz".into(),
            checksum: None,
            sha256: None,
            source: None,
            source_checksum: None,
            source_sha256: None,
            cpe: None,
            cpes: None,
            purl: None,
            licenses: None,
            deprecation_date: None,
            strip_components: 0,
        };
        overrides(&mut d);
        d
    }

    #[test]
    fn preserves_input_order_and_core_fields() {
        let deps = vec![
            dep(|d| d.id = "a".into()),
            dep(|d| d.id = "b".into()),
        ];
        let bom = generate_bill_of_materials(&deps);
        assert_eq!(bom[0].name, "a");
        assert_eq!(bom[1].name, "b");
    }

    #[test]
    fn checksum_prefers_canonical_over_legacy_sha256() {
        let d = dep(|d| {
            d.checksum = Some("sha512:aa".into());
            d.sha256 = Some("bb".into());
        });
        let bom = generate_bill_of_materials(&[d]);
        assert_eq!(bom[0].checksum, Checksum::Sha512("aa".into()));
    }

    #[test]
    fn missing_checksum_is_unknown() {
        let d = dep(|_| {});
        let bom = generate_bill_of_materials(&[d]);
        assert!(bom[0].checksum.is_unknown());
    }

    #[test]
    fn cpe_takes_precedence_over_cpes() {
        let d = dep(|d| {
            d.cpe = Some("cpe:/a:vendor:product".into());
            d.cpes = Some(vec!["cpe:/a:other:product".into()]);
        });
        let bom = generate_bill_of_materials(&[d]);
        assert_eq!(bom[0].cpe.as_deref(), Some("cpe:/a:vendor:product"));
    }

    #[test]
    fn falls_back_to_first_cpes_entry_when_cpe_absent() {
        let d = dep(|d| {
            d.cpes = Some(vec!["cpe:/a:other:product".into()]);
        });
        let bom = generate_bill_of_materials(&[d]);
        assert_eq!(bom[0].cpe.as_deref(), Some("cpe:/a:other:product"));
    }
}
