use common::types::{CriterionKind, RiskCriterion};

/// 一次评估中的全部标准结果，只在单次评估内存在
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaSet {
    criteria: Vec<RiskCriterion>,
}

impl CriteriaSet {
    /// 按标准编号排序保存
    pub fn new(mut criteria: Vec<RiskCriterion>) -> Self {
        criteria.sort_by_key(|c| c.kind.number());
        Self { criteria }
    }

    pub fn get(&self, kind: CriterionKind) -> Option<&RiskCriterion> {
        self.criteria.iter().find(|c| c.kind == kind)
    }

    /// 缺失的标准视为未触发
    pub fn is_triggered(&self, kind: CriterionKind) -> bool {
        self.get(kind).map(|c| c.triggered).unwrap_or(false)
    }

    /// 支撑数值，缺失时为 0
    pub fn value(&self, kind: CriterionKind) -> f64 {
        self.get(kind).and_then(|c| c.value).unwrap_or(0.0)
    }

    /// 触发的标准数，每项只计一次
    pub fn risk_count(&self) -> u32 {
        CriterionKind::ALL
            .iter()
            .filter(|kind| self.is_triggered(**kind))
            .count() as u32
    }

    pub fn triggered(&self) -> impl Iterator<Item = &RiskCriterion> {
        self.criteria.iter().filter(|c| c.triggered)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskCriterion> {
        self.criteria.iter()
    }

    pub fn into_vec(self) -> Vec<RiskCriterion> {
        self.criteria
    }
}
