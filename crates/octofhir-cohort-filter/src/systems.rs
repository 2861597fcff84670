//! Coding systems referenced by filter values

/// CIM-10 diagnosis hierarchy
pub const CONDITION_HIERARCHY: &str = "https://terminology.eds.aphp.fr/aphp-orbis-cim";
/// CCAM procedure hierarchy
pub const PROCEDURE_HIERARCHY: &str = "https://terminology.eds.aphp.fr/aphp-orbis-ccam";
/// GHM claim hierarchy
pub const CLAIM_HIERARCHY: &str = "https://terminology.eds.aphp.fr/aphp-orbis-ghm";
/// ATC medication classification
pub const MEDICATION_ATC: &str = "https://terminology.eds.aphp.fr/atc";
/// ANABIO biology hierarchy
pub const BIOLOGY_HIERARCHY_ITM_ANABIO: &str = "https://terminology.eds.aphp.fr/aphp-itm-anabio";
/// Document validation status
pub const DOC_STATUS_CODE_SYSTEM: &str = "http://hl7.org/fhir/CodeSystem/composition-status";
/// Study instance UID identifier system
pub const IMAGING_STUDY_UID_URL: &str = "urn:dicom:uid";
