// crates/sh_field/src/ldd.rs

//! 流向场与沿流向累积
//!
//! [`LddField`] 使用小键盘编码的局部排水方向：
//!
//! ```text
//! 7 8 9
//! 4 5 6
//! 1 2 3
//! ```
//!
//! 5 表示汇点（出口），其余编码指向下游相邻单元。流向图必须是有向无环图，
//! 累积按拓扑序自上游向下游推进。本引擎自身不调用累积算子，
//! 它服务于消费月产沙场的河网汇流模块。

use crate::domain::{ensure_same_domain, SharedDomain};
use crate::field::{is_defined, Field};
use ndarray::Array2;
use sh_foundation::error::{ShError, ShResult};
use std::collections::VecDeque;

/// 汇点编码
pub const PIT: u8 = 5;

/// 编码对应的 (行偏移, 列偏移)
#[inline]
fn offset(code: u8) -> Option<(isize, isize)> {
    match code {
        1 => Some((1, -1)),
        2 => Some((1, 0)),
        3 => Some((1, 1)),
        4 => Some((0, -1)),
        6 => Some((0, 1)),
        7 => Some((-1, -1)),
        8 => Some((-1, 0)),
        9 => Some((-1, 1)),
        _ => None,
    }
}

/// 局部排水方向场
#[derive(Debug, Clone)]
pub struct LddField {
    domain: SharedDomain,
    data: Array2<Option<u8>>,
    /// 每个单元的下游线性索引（汇点或未定义为 None）
    downstream: Vec<Option<usize>>,
}

impl LddField {
    /// 由行主序编码创建，校验编码范围和下游指向
    pub fn from_vec(domain: SharedDomain, codes: Vec<Option<u8>>) -> ShResult<Self> {
        ShError::check_size("ldd", domain.cell_count(), codes.len())?;
        let mut downstream = vec![None; codes.len()];

        for (i, code) in codes.iter().enumerate() {
            let Some(code) = *code else { continue };
            if !(1..=9).contains(&code) {
                return Err(ShError::invalid_input(format!(
                    "无效流向编码 {} (单元 {})",
                    code, i
                )));
            }
            if code == PIT {
                continue;
            }
            let (r, c) = domain.position(i);
            let (dr, dc) = offset(code).ok_or_else(|| ShError::internal("流向编码表不完整"))?;
            let (nr, nc) = (r as isize + dr, c as isize + dc);
            if !domain.contains(nr, nc) {
                return Err(ShError::invalid_input(format!(
                    "单元 ({}, {}) 的流向指出研究域",
                    r, c
                )));
            }
            let j = domain.index(nr as usize, nc as usize);
            if codes[j].is_none() {
                return Err(ShError::invalid_input(format!(
                    "单元 ({}, {}) 的流向指向未定义单元",
                    r, c
                )));
            }
            downstream[i] = Some(j);
        }

        let data = Array2::from_shape_vec(domain.shape(), codes)
            .map_err(|e| ShError::internal(e.to_string()))?;
        Ok(Self {
            domain,
            data,
            downstream,
        })
    }

    /// 由标量场创建（单元值取整为编码，未定义单元无流向）
    pub fn from_field(field: &Field) -> ShResult<Self> {
        let mut codes = Vec::with_capacity(field.domain().cell_count());
        for v in field.data().iter() {
            if !is_defined(*v) {
                codes.push(None);
                continue;
            }
            let code = v.round();
            if !(1.0..=9.0).contains(&code) {
                return Err(ShError::invalid_input(format!("无效流向编码 {}", v)));
            }
            codes.push(Some(code as u8));
        }
        Self::from_vec(field.domain().clone(), codes)
    }

    /// 研究域
    #[inline]
    pub fn domain(&self) -> &SharedDomain {
        &self.domain
    }

    /// 读取编码
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        self.data.get((row, col)).copied().flatten()
    }

    /// 下游单元 (row, col)，汇点返回 None
    pub fn downstream_of(&self, row: usize, col: usize) -> Option<(usize, usize)> {
        self.downstream
            .get(self.domain.index(row, col))
            .copied()
            .flatten()
            .map(|j| self.domain.position(j))
    }

    /// 自上游向下游的拓扑序（Kahn 算法），存在环路时报错
    fn topological_order(&self) -> ShResult<Vec<usize>> {
        let n = self.domain.cell_count();
        let mut indegree = vec![0usize; n];
        for j in self.downstream.iter().flatten() {
            indegree[*j] += 1;
        }

        let defined: Vec<bool> = self.data.iter().map(|c| c.is_some()).collect();
        let mut queue: VecDeque<usize> = (0..n)
            .filter(|&i| defined[i] && indegree[i] == 0)
            .collect();
        let mut order = Vec::with_capacity(n);

        while let Some(i) = queue.pop_front() {
            order.push(i);
            if let Some(j) = self.downstream[i] {
                indegree[j] -= 1;
                if indegree[j] == 0 {
                    queue.push_back(j);
                }
            }
        }

        let expected = defined.iter().filter(|d| **d).count();
        if order.len() != expected {
            return Err(ShError::invalid_input(format!(
                "流向场存在环路: {} 个单元无法排序",
                expected - order.len()
            )));
        }
        Ok(order)
    }

    /// 沿流向累积（accuflux）：每个单元的结果为自身物质量加全部上游物质量
    ///
    /// 上游任一单元物质量未定义时，其下游全部未定义。
    pub fn accuflux(&self, material: &Field) -> ShResult<Field> {
        self.accumulate(material, 1.0).map(|(state, _)| state)
    }

    /// 按比例沿流向传输（accufractionflux）
    ///
    /// 每个单元向下游输出 `fraction × (自身物质量 + 上游来量)`，返回各单元的出流量。
    pub fn accufraction_flux(&self, material: &Field, fraction: f64) -> ShResult<Field> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ShError::out_of_range("fraction", fraction, 0.0, 1.0));
        }
        self.accumulate(material, fraction).map(|(_, flux)| flux)
    }

    /// 返回 (累积量, 出流量)
    fn accumulate(&self, material: &Field, fraction: f64) -> ShResult<(Field, Field)> {
        ensure_same_domain(&self.domain, material.domain())?;
        let order = self.topological_order()?;
        let n = self.domain.cell_count();
        let values = material.to_vec();
        let mut inflow = vec![0.0; n];
        let mut total = vec![f64::NAN; n];
        let mut flux = vec![f64::NAN; n];

        for i in order {
            let own = values[i];
            let amount = own + inflow[i];
            let out = if is_defined(amount) { amount * fraction } else { f64::NAN };
            total[i] = amount;
            flux[i] = out;
            if let Some(j) = self.downstream[i] {
                inflow[j] += out;
            }
        }

        Ok((
            Field::from_vec(self.domain.clone(), total)?,
            Field::from_vec(self.domain.clone(), flux)?,
        ))
    }
}
