// crates/sv_state/src/field_kind.rs

//! 场类型

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sv_foundation::SvError;

/// 可查询、可显示的场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// 自由面高度 `h`
    FreeSurface,
    /// 水深
    Depth,
    /// 水柱高度 `h + depth`（干单元为哨兵值）
    WaterColumn,
    /// 盐度 `s`
    Salinity,
    /// 盐度扰动 `s - s0`
    SalinityPerturbation,
    /// 背景盐度 `s0`
    BackgroundSalinity,
    /// 单元中心东向速度
    UVelocity,
    /// 单元中心北向速度
    VVelocity,
    /// 单元中心垂向速度
    WVelocity,
    /// 无场：只区分有数据/无数据
    Mask,
}

impl FieldKind {
    /// 全部场类型
    pub const ALL: [FieldKind; 10] = [
        Self::FreeSurface,
        Self::Depth,
        Self::WaterColumn,
        Self::Salinity,
        Self::SalinityPerturbation,
        Self::BackgroundSalinity,
        Self::UVelocity,
        Self::VVelocity,
        Self::WVelocity,
        Self::Mask,
    ];

    /// 是否随垂向层变化
    pub fn is_layered(&self) -> bool {
        !matches!(self, Self::FreeSurface | Self::Depth | Self::WaterColumn)
    }

    /// 名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::FreeSurface => "free_surface",
            Self::Depth => "depth",
            Self::WaterColumn => "water_column",
            Self::Salinity => "salinity",
            Self::SalinityPerturbation => "salinity_perturbation",
            Self::BackgroundSalinity => "background_salinity",
            Self::UVelocity => "u",
            Self::VVelocity => "v",
            Self::WVelocity => "w",
            Self::Mask => "mask",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FieldKind {
    type Err = SvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.as_str() {
            "free_surface" | "h" | "eta" => Ok(Self::FreeSurface),
            "depth" | "d" => Ok(Self::Depth),
            "water_column" | "h_d" => Ok(Self::WaterColumn),
            "salinity" | "s" => Ok(Self::Salinity),
            "salinity_perturbation" | "sd" => Ok(Self::SalinityPerturbation),
            "background_salinity" | "s0" => Ok(Self::BackgroundSalinity),
            "u" => Ok(Self::UVelocity),
            "v" => Ok(Self::VVelocity),
            "w" => Ok(Self::WVelocity),
            "mask" | "none" => Ok(Self::Mask),
            _ => Err(SvError::invalid_input(format!("未知场类型: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_round_trip() {
        for kind in FieldKind::ALL {
            assert_eq!(kind.name().parse::<FieldKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_aliases_and_unknown() {
        assert_eq!("S0".parse::<FieldKind>().unwrap(), FieldKind::BackgroundSalinity);
        assert_eq!("h_d".parse::<FieldKind>().unwrap(), FieldKind::WaterColumn);
        assert!("temperature".parse::<FieldKind>().is_err());
    }

    #[test]
    fn test_layered() {
        assert!(!FieldKind::FreeSurface.is_layered());
        assert!(!FieldKind::WaterColumn.is_layered());
        assert!(FieldKind::WVelocity.is_layered());
        assert!(FieldKind::Mask.is_layered());
    }
}
