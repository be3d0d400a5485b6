//! 订单仓库
//!
//! 同时持有两份数据：
//! - 年份索引：年份 → 去重且有序的订单号集合，只增不减
//! - 详情表：订单号 → 订单详情，按写入顺序保存
//!
//! 每次 `merge` / `save_detail` 都把整份结构写回存储（读-改-写，后写覆盖先写），
//! 写完才返回，调用方随后再发刷新通知。并发写入由调用方的单任务守卫排除。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::storage::{get_or, put, KEY_ORDERS_BY_YEAR, KEY_ORDER_DETAILS};
use crate::infrastructure::KeyValueStore;
use crate::models::{OrderDetail, OrderId};
use crate::services::exporter;

pub type YearIndex = BTreeMap<i32, BTreeSet<OrderId>>;
pub type DetailStore = IndexMap<OrderId, OrderDetail>;

pub struct OrdersRepository {
    store: Arc<dyn KeyValueStore>,
    orders_by_year: YearIndex,
    order_details: DetailStore,
}

impl OrdersRepository {
    /// 从存储中加载最新状态
    pub async fn load(store: Arc<dyn KeyValueStore>) -> AppResult<Self> {
        debug!("正在加载订单仓库");
        let orders_by_year: YearIndex =
            get_or(store.as_ref(), KEY_ORDERS_BY_YEAR, YearIndex::new()).await?;
        let order_details: DetailStore =
            get_or(store.as_ref(), KEY_ORDER_DETAILS, DetailStore::new()).await?;

        Ok(Self {
            store,
            orders_by_year,
            order_details,
        })
    }

    pub fn orders_by_year(&self) -> &YearIndex {
        &self.orders_by_year
    }

    pub fn order_details(&self) -> &DetailStore {
        &self.order_details
    }

    /// 合并某一年新发现的订单号并写回存储
    pub async fn merge(&mut self, year: i32, order_ids: &[OrderId]) -> AppResult<()> {
        debug!("[年份 {}] 保存订单号: {:?}", year, order_ids);
        let known = self.orders_by_year.entry(year).or_default();
        known.extend(order_ids.iter().cloned());
        let count = known.len();

        put(self.store.as_ref(), KEY_ORDERS_BY_YEAR, &self.orders_by_year).await?;
        info!("[年份 {}] 订单号已保存，共 {} 个", year, count);
        Ok(())
    }

    /// 第一个还没有详情的订单号
    ///
    /// 先按年份、再按年份内的排序依次查找；全部都有详情时返回 None。
    pub fn next_without_detail(&self) -> Option<&OrderId> {
        self.orders_by_year
            .values()
            .flatten()
            .find(|id| !self.order_details.contains_key(*id))
    }

    pub fn detail_for(&self, order_id: &OrderId) -> Option<&OrderDetail> {
        self.order_details.get(order_id)
    }

    /// 写入（或覆盖）订单详情并写回存储
    pub async fn save_detail(&mut self, order_id: OrderId, detail: OrderDetail) -> AppResult<()> {
        debug!("[订单 {}] 保存订单详情: {:?}", order_id, detail);
        self.order_details.insert(order_id.clone(), detail);

        put(self.store.as_ref(), KEY_ORDER_DETAILS, &self.order_details).await?;
        info!("[订单 {}] 订单详情已保存", order_id);
        Ok(())
    }

    /// 已发现的订单号总数
    pub fn known_count(&self) -> usize {
        self.orders_by_year.values().map(BTreeSet::len).sum()
    }

    /// 已发现但还没有详情的订单号数量
    pub fn missing_count(&self) -> usize {
        self.orders_by_year
            .values()
            .flatten()
            .filter(|id| !self.order_details.contains_key(*id))
            .count()
    }

    /// 导出制表符分隔的平表
    pub fn export(&self, config: &Config) -> String {
        info!("正在生成导出数据");
        exporter::to_tsv(&self.order_details, config)
    }
}
