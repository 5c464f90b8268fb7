// src/processing/dispatch.rs
//! Binds an index identifier to a kernel: resolves band roles, fills in
//! the literal preset coefficients, emits the citation token and runs.

use std::fmt;

use log::warn;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::citations::{Citation, CitationRegistry};
use crate::endmember::Endmembers;
use crate::error::{EngineError, EngineResult};
use crate::params::TsaParams;
use crate::processing::kernels::{
    BandCopy, ContinuumRemoval, IndexKernel, KernelizedNdvi, MixtureAnalysis,
    ModifiedSimpleRatio, NormalizedDifference, RatioMinusOne, ResistanceIndex, TasseledCap,
    TasseledComponent,
};
use crate::sensor::{BandRole, SensorBands};
use crate::stack::{ArdStack, TsOutput};

/// Every index identifier the engine can evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpectralIndex {
    // band copies
    Blue,
    Green,
    Red,
    Nir,
    Swir0,
    Swir1,
    Swir2,
    RedEdge1,
    RedEdge2,
    RedEdge3,
    BroadNir,
    Vv,
    Vh,
    // normalized differences
    Ndvi,
    Nbr,
    Ndbi,
    Ndwi,
    Mndwi,
    Ndsi,
    Ndti,
    Ndmi,
    Ndre1,
    Ndre2,
    NdviRe1,
    NdviRe2,
    NdviRe3,
    NdviRe1n,
    NdviRe2n,
    NdviRe3n,
    Cci,
    // ratio family
    CiRe,
    MsrRe,
    MsrReN,
    // kernelized
    KNdvi,
    // resistance family
    Evi,
    Evi2,
    Arvi,
    Savi,
    Sarvi,
    // Tasseled Cap
    Tcb,
    Tcg,
    Tcw,
    Tcd,
    // continuum removal
    Csw,
    // unmixing
    Sma,
}

impl SpectralIndex {
    /// External identifier spelling.
    pub fn name(&self) -> &'static str {
        match self {
            SpectralIndex::Blue => "BLUE",
            SpectralIndex::Green => "GREEN",
            SpectralIndex::Red => "RED",
            SpectralIndex::Nir => "NIR",
            SpectralIndex::Swir0 => "SWIR0",
            SpectralIndex::Swir1 => "SWIR1",
            SpectralIndex::Swir2 => "SWIR2",
            SpectralIndex::RedEdge1 => "REDEDGE1",
            SpectralIndex::RedEdge2 => "REDEDGE2",
            SpectralIndex::RedEdge3 => "REDEDGE3",
            SpectralIndex::BroadNir => "BNIR",
            SpectralIndex::Vv => "VV",
            SpectralIndex::Vh => "VH",
            SpectralIndex::Ndvi => "NDVI",
            SpectralIndex::Nbr => "NBR",
            SpectralIndex::Ndbi => "NDBI",
            SpectralIndex::Ndwi => "NDWI",
            SpectralIndex::Mndwi => "MNDWI",
            SpectralIndex::Ndsi => "NDSI",
            SpectralIndex::Ndti => "NDTI",
            SpectralIndex::Ndmi => "NDMI",
            SpectralIndex::Ndre1 => "NDRE1",
            SpectralIndex::Ndre2 => "NDRE2",
            SpectralIndex::NdviRe1 => "NDVIRE1",
            SpectralIndex::NdviRe2 => "NDVIRE2",
            SpectralIndex::NdviRe3 => "NDVIRE3",
            SpectralIndex::NdviRe1n => "NDVIRE1N",
            SpectralIndex::NdviRe2n => "NDVIRE2N",
            SpectralIndex::NdviRe3n => "NDVIRE3N",
            SpectralIndex::Cci => "CCI",
            SpectralIndex::CiRe => "CIRE",
            SpectralIndex::MsrRe => "MSRRE",
            SpectralIndex::MsrReN => "MSRREN",
            SpectralIndex::KNdvi => "KNDVI",
            SpectralIndex::Evi => "EVI",
            SpectralIndex::Evi2 => "EVI2",
            SpectralIndex::Arvi => "ARVI",
            SpectralIndex::Savi => "SAVI",
            SpectralIndex::Sarvi => "SARVI",
            SpectralIndex::Tcb => "TCB",
            SpectralIndex::Tcg => "TCG",
            SpectralIndex::Tcw => "TCW",
            SpectralIndex::Tcd => "TCD",
            SpectralIndex::Csw => "CSW",
            SpectralIndex::Sma => "SMA",
        }
    }

    /// Parse an external identifier, case-insensitive. `None` for an
    /// identifier the engine does not know.
    pub fn from_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        ALL.iter().copied().find(|ix| ix.name() == upper)
    }
}

const ALL: [SpectralIndex; 45] = [
    SpectralIndex::Blue,
    SpectralIndex::Green,
    SpectralIndex::Red,
    SpectralIndex::Nir,
    SpectralIndex::Swir0,
    SpectralIndex::Swir1,
    SpectralIndex::Swir2,
    SpectralIndex::RedEdge1,
    SpectralIndex::RedEdge2,
    SpectralIndex::RedEdge3,
    SpectralIndex::BroadNir,
    SpectralIndex::Vv,
    SpectralIndex::Vh,
    SpectralIndex::Ndvi,
    SpectralIndex::Nbr,
    SpectralIndex::Ndbi,
    SpectralIndex::Ndwi,
    SpectralIndex::Mndwi,
    SpectralIndex::Ndsi,
    SpectralIndex::Ndti,
    SpectralIndex::Ndmi,
    SpectralIndex::Ndre1,
    SpectralIndex::Ndre2,
    SpectralIndex::NdviRe1,
    SpectralIndex::NdviRe2,
    SpectralIndex::NdviRe3,
    SpectralIndex::NdviRe1n,
    SpectralIndex::NdviRe2n,
    SpectralIndex::NdviRe3n,
    SpectralIndex::Cci,
    SpectralIndex::CiRe,
    SpectralIndex::MsrRe,
    SpectralIndex::MsrReN,
    SpectralIndex::KNdvi,
    SpectralIndex::Evi,
    SpectralIndex::Evi2,
    SpectralIndex::Arvi,
    SpectralIndex::Savi,
    SpectralIndex::Sarvi,
    SpectralIndex::Tcb,
    SpectralIndex::Tcg,
    SpectralIndex::Tcw,
    SpectralIndex::Tcd,
    SpectralIndex::Csw,
    SpectralIndex::Sma,
];

impl fmt::Display for SpectralIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for SpectralIndex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for SpectralIndex {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        SpectralIndex::from_name(&name)
            .ok_or_else(|| D::Error::custom(format!("unknown spectral index `{name}`")))
    }
}

/// Compute one spectral index time series over the stack.
///
/// On `Ok(())` every output cell has been written. Structural problems
/// (shape mismatches, missing band roles, missing endmembers) return an
/// error before any cell is touched.
#[allow(clippy::too_many_arguments)]
pub fn compute_index(
    stack: &ArdStack,
    mask: Option<&[u8]>,
    out: &mut TsOutput,
    index: SpectralIndex,
    nodata: i16,
    tsa: &TsaParams,
    sensor: &SensorBands,
    endmembers: Option<&Endmembers>,
    citations: &CitationRegistry,
) -> EngineResult<()> {
    if out.ndates() != stack.ndates() || out.ncells() != stack.ncells() {
        return Err(EngineError::OutputShape {
            out_dates: out.ndates(),
            out_cells: out.ncells(),
            stack_dates: stack.ndates(),
            stack_cells: stack.ncells(),
        });
    }
    if let Some(m) = mask {
        if m.len() != stack.ncells() {
            return Err(EngineError::MaskLength {
                got: m.len(),
                expected: stack.ncells(),
            });
        }
    }

    let band = |role: BandRole| -> EngineResult<usize> {
        let b = sensor.require(role)?;
        if b >= stack.nbands() {
            return Err(EngineError::BandRange {
                band: b,
                nbands: stack.nbands(),
            });
        }
        Ok(b)
    };
    let norm_diff = |a: BandRole, b: BandRole| -> EngineResult<Box<dyn IndexKernel>> {
        Ok(Box::new(NormalizedDifference::new(band(a)?, band(b)?)))
    };
    let tasseled = |component: TasseledComponent| -> EngineResult<Box<dyn IndexKernel>> {
        Ok(Box::new(TasseledCap::new(
            component,
            [
                band(BandRole::Blue)?,
                band(BandRole::Green)?,
                band(BandRole::Red)?,
                band(BandRole::Nir)?,
                band(BandRole::Swir1)?,
                band(BandRole::Swir2)?,
            ],
        )))
    };
    let resistance = |f1: f32, f2: f32, f3: f32, f4: f32, rbc: bool, red_as_blue: bool| {
        let blue = if red_as_blue {
            band(BandRole::Red)
        } else {
            band(BandRole::Blue)
        };
        Ok::<Box<dyn IndexKernel>, EngineError>(Box::new(ResistanceIndex::new(
            band(BandRole::Nir)?,
            band(BandRole::Red)?,
            blue?,
            f1,
            f2,
            f3,
            f4,
            rbc,
        )))
    };

    use BandRole::*;
    use SpectralIndex as Ix;

    let kernel: Box<dyn IndexKernel> = match index {
        Ix::Blue => Box::new(BandCopy::new(band(Blue)?)),
        Ix::Green => Box::new(BandCopy::new(band(Green)?)),
        Ix::Red => Box::new(BandCopy::new(band(Red)?)),
        Ix::Nir => Box::new(BandCopy::new(band(Nir)?)),
        Ix::Swir0 => Box::new(BandCopy::new(band(Swir0)?)),
        Ix::Swir1 => Box::new(BandCopy::new(band(Swir1)?)),
        Ix::Swir2 => Box::new(BandCopy::new(band(Swir2)?)),
        Ix::RedEdge1 => Box::new(BandCopy::new(band(RedEdge1)?)),
        Ix::RedEdge2 => Box::new(BandCopy::new(band(RedEdge2)?)),
        Ix::RedEdge3 => Box::new(BandCopy::new(band(RedEdge3)?)),
        Ix::BroadNir => Box::new(BandCopy::new(band(BroadNir)?)),
        Ix::Vv => Box::new(BandCopy::new(band(Vv)?)),
        Ix::Vh => Box::new(BandCopy::new(band(Vh)?)),

        Ix::Ndvi => {
            citations.cite(Citation::Ndvi);
            norm_diff(Nir, Red)?
        }
        Ix::Nbr => {
            citations.cite(Citation::Nbr);
            norm_diff(Nir, Swir2)?
        }
        Ix::Ndbi => {
            citations.cite(Citation::Ndbi);
            norm_diff(Swir1, Nir)?
        }
        Ix::Ndwi => {
            citations.cite(Citation::Ndwi);
            norm_diff(Green, Nir)?
        }
        Ix::Mndwi => {
            citations.cite(Citation::Mndwi);
            norm_diff(Green, Swir1)?
        }
        Ix::Ndsi => {
            citations.cite(Citation::Ndsi);
            norm_diff(Green, Swir1)?
        }
        Ix::Ndti => {
            citations.cite(Citation::Ndti);
            norm_diff(Swir1, Swir2)?
        }
        Ix::Ndmi => {
            citations.cite(Citation::Ndmi);
            norm_diff(Nir, Swir1)?
        }
        Ix::Ndre1 => {
            citations.cite(Citation::Ndre1);
            norm_diff(RedEdge2, RedEdge1)?
        }
        Ix::Ndre2 => {
            citations.cite(Citation::Ndre2);
            norm_diff(RedEdge3, RedEdge1)?
        }
        Ix::NdviRe1 => {
            citations.cite(Citation::NdviRe);
            norm_diff(BroadNir, RedEdge1)?
        }
        Ix::NdviRe2 => {
            citations.cite(Citation::NdviRe);
            norm_diff(BroadNir, RedEdge2)?
        }
        Ix::NdviRe3 => {
            citations.cite(Citation::NdviRe);
            norm_diff(BroadNir, RedEdge3)?
        }
        Ix::NdviRe1n => {
            citations.cite(Citation::NdviRe);
            norm_diff(Nir, RedEdge1)?
        }
        Ix::NdviRe2n => {
            citations.cite(Citation::NdviRe);
            norm_diff(Nir, RedEdge2)?
        }
        Ix::NdviRe3n => {
            citations.cite(Citation::NdviRe);
            norm_diff(Nir, RedEdge3)?
        }
        Ix::Cci => {
            citations.cite(Citation::Cci);
            norm_diff(Green, Red)?
        }

        Ix::CiRe => {
            citations.cite(Citation::CiRe);
            Box::new(RatioMinusOne::new(band(RedEdge3)?, band(RedEdge1)?))
        }
        Ix::MsrRe => {
            citations.cite(Citation::MsrRe);
            Box::new(ModifiedSimpleRatio::new(band(BroadNir)?, band(RedEdge1)?))
        }
        Ix::MsrReN => {
            citations.cite(Citation::MsrRe);
            Box::new(ModifiedSimpleRatio::new(band(Nir)?, band(RedEdge1)?))
        }

        Ix::KNdvi => {
            citations.cite(Citation::KNdvi);
            Box::new(KernelizedNdvi::new(band(Nir)?, band(Red)?))
        }

        Ix::Evi => {
            citations.cite(Citation::Evi);
            resistance(2.5, 6.0, 7.5, 1.0, false, false)?
        }
        Ix::Evi2 => {
            citations.cite(Citation::Evi2);
            resistance(2.4, 1.0, 0.0, 1.0, false, true)?
        }
        Ix::Arvi => {
            citations.cite(Citation::Sarvi);
            resistance(1.0, 1.0, 0.0, 0.0, true, false)?
        }
        Ix::Savi => {
            citations.cite(Citation::Sarvi);
            resistance(1.5, 1.0, 0.0, 0.5, false, false)?
        }
        Ix::Sarvi => {
            citations.cite(Citation::Sarvi);
            resistance(1.5, 1.0, 0.0, 0.5, true, false)?
        }

        Ix::Tcb => {
            citations.cite(Citation::TasseledCap);
            tasseled(TasseledComponent::Brightness)?
        }
        Ix::Tcg => {
            citations.cite(Citation::TasseledCap);
            tasseled(TasseledComponent::Greenness)?
        }
        Ix::Tcw => {
            citations.cite(Citation::TasseledCap);
            tasseled(TasseledComponent::Wetness)?
        }
        Ix::Tcd => {
            citations.cite(Citation::Disturbance);
            tasseled(TasseledComponent::Disturbance)?
        }

        Ix::Csw => Box::new(ContinuumRemoval::new(
            band(Swir1)?,
            band(Nir)?,
            band(Swir2)?,
            sensor.wavelength(Swir1)?,
            sensor.wavelength(Nir)?,
            sensor.wavelength(Swir2)?,
        )),

        Ix::Sma => {
            citations.cite(Citation::Sma);
            let em = endmembers.ok_or(EngineError::MissingEndmembers)?;
            if em.nbands() != stack.nbands() {
                return Err(EngineError::EndmemberBands {
                    endmember: em.nbands(),
                    stack: stack.nbands(),
                });
            }
            if tsa.sma.endmember == 0 || tsa.sma.endmember > em.count() {
                return Err(EngineError::EndmemberSelection {
                    selected: tsa.sma.endmember,
                    count: em.count(),
                });
            }
            if tsa.sma.emit_rms && !out.has_residuals() {
                return Err(EngineError::MissingResidualPlanes);
            }
            Box::new(MixtureAnalysis::new(em, tsa.sma.clone()))
        }
    };

    kernel.apply(stack, mask, out, nodata)
}

/// String-identifier entry point. An unknown identifier logs a warning,
/// leaves the output untouched and reports success; the surrounding
/// pipeline decides what to do with the gap.
#[allow(clippy::too_many_arguments)]
pub fn compute_index_named(
    stack: &ArdStack,
    mask: Option<&[u8]>,
    out: &mut TsOutput,
    index_name: &str,
    nodata: i16,
    tsa: &TsaParams,
    sensor: &SensorBands,
    endmembers: Option<&Endmembers>,
    citations: &CitationRegistry,
) -> EngineResult<()> {
    match SpectralIndex::from_name(index_name) {
        Some(index) => compute_index(
            stack, mask, out, index, nodata, tsa, sensor, endmembers, citations,
        ),
        None => {
            warn!("unknown spectral index identifier: {index_name}");
            Ok(())
        }
    }
}
