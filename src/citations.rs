// src/citations.rs
use std::collections::HashSet;

use log::info;
use parking_lot::Mutex;

/// Stable citation token, one per index family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Citation {
    Ndvi,
    Evi,
    Evi2,
    Sarvi,
    Nbr,
    TasseledCap,
    Disturbance,
    Ndbi,
    Ndwi,
    Mndwi,
    Ndsi,
    Sma,
    Ndti,
    Ndmi,
    KNdvi,
    Ndre1,
    Ndre2,
    CiRe,
    NdviRe,
    MsrRe,
    Cci,
}

impl Citation {
    /// Literature reference behind the token.
    pub fn reference(&self) -> &'static str {
        match self {
            Citation::Ndvi => {
                "Tucker, C.J. (1979): Red and photographic infrared linear combinations for monitoring vegetation. Remote Sensing of Environment 8, 127-150"
            }
            Citation::Evi => {
                "Huete, A. et al. (2002): Overview of the radiometric and biophysical performance of the MODIS vegetation indices. Remote Sensing of Environment 83, 195-213"
            }
            Citation::Evi2 => {
                "Jiang, Z. et al. (2008): Development of a two-band enhanced vegetation index without a blue band. Remote Sensing of Environment 112, 3833-3845"
            }
            Citation::Sarvi => {
                "Kaufman, Y.J. & Tanre, D. (1992): Atmospherically resistant vegetation index (ARVI) for EOS-MODIS. IEEE TGRS 30, 261-270"
            }
            Citation::Nbr => {
                "Key, C.H. & Benson, N.C. (2006): Landscape assessment: ground measure of severity, the Composite Burn Index. FIREMON, USDA Forest Service"
            }
            Citation::TasseledCap => {
                "Crist, E.P. (1985): A TM Tasseled Cap equivalent transformation for reflectance factor data. Remote Sensing of Environment 17, 301-306"
            }
            Citation::Disturbance => {
                "Healey, S.P. et al. (2005): Comparison of Tasseled Cap-based Landsat data structures for use in forest disturbance detection. Remote Sensing of Environment 97, 301-310"
            }
            Citation::Ndbi => {
                "Zha, Y. et al. (2003): Use of normalized difference built-up index in automatically mapping urban areas from TM imagery. IJRS 24, 583-594"
            }
            Citation::Ndwi => {
                "McFeeters, S.K. (1996): The use of the Normalized Difference Water Index (NDWI) in the delineation of open water features. IJRS 17, 1425-1432"
            }
            Citation::Mndwi => {
                "Xu, H. (2006): Modification of normalised difference water index (NDWI) to enhance open water features. IJRS 27, 3025-3033"
            }
            Citation::Ndsi => {
                "Hall, D.K. et al. (1995): Development of methods for mapping global snow cover using MODIS data. Remote Sensing of Environment 54, 127-140"
            }
            Citation::Sma => {
                "Smith, M.O. et al. (1990): Vegetation in deserts: I. A regional measure of abundance from multispectral images. Remote Sensing of Environment 31, 1-26"
            }
            Citation::Ndti => {
                "Van Deventer, A.P. et al. (1997): Using Thematic Mapper data to identify contrasting soil plains and tillage practices. PE&RS 63, 87-93"
            }
            Citation::Ndmi => {
                "Gao, B. (1996): NDWI - A normalized difference water index for remote sensing of vegetation liquid water from space. Remote Sensing of Environment 58, 257-266"
            }
            Citation::KNdvi => {
                "Camps-Valls, G. et al. (2021): A unified vegetation index for quantifying the terrestrial biosphere. Science Advances 7, eabc7447"
            }
            Citation::Ndre1 | Citation::Ndre2 => {
                "Gitelson, A. & Merzlyak, M.N. (1994): Spectral reflectance changes associated with autumn senescence of Aesculus hippocastanum and Acer platanoides leaves. J. Plant Physiology 143, 286-292"
            }
            Citation::CiRe => {
                "Gitelson, A.A. et al. (2003): Relationships between leaf chlorophyll content and spectral reflectance. J. Plant Physiology 160, 271-282"
            }
            Citation::NdviRe => {
                "Fernandez-Manso, A. et al. (2016): SENTINEL-2A red-edge spectral indices suitability for discriminating burn severity. Int. J. Applied Earth Observation 50, 170-175"
            }
            Citation::MsrRe => {
                "Chen, J.M. (1996): Evaluation of vegetation indices and a modified simple ratio for boreal applications. Canadian J. Remote Sensing 22, 229-242"
            }
            Citation::Cci => {
                "Gamon, J.A. et al. (2016): A remotely sensed pigment index reveals photosynthetic phenology in evergreen conifers. PNAS 113, 13087-13092"
            }
        }
    }
}

/// Append-only, idempotent registry of citations emitted during dispatch.
/// Each token is logged once at info level; repeats are no-ops.
#[derive(Default)]
pub struct CitationRegistry {
    seen: Mutex<HashSet<Citation>>,
}

impl CitationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cite(&self, citation: Citation) {
        if self.seen.lock().insert(citation) {
            info!("citation: {}", citation.reference());
        }
    }

    pub fn cited(&self) -> Vec<Citation> {
        self.seen.lock().iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citing_is_idempotent() {
        let registry = CitationRegistry::new();
        registry.cite(Citation::Ndvi);
        registry.cite(Citation::Ndvi);
        registry.cite(Citation::Sma);
        let mut cited = registry.cited();
        cited.sort_by_key(|c| format!("{c:?}"));
        assert_eq!(cited, vec![Citation::Ndvi, Citation::Sma]);
    }
}
