//! Named keyword tables used by the title pre-filter, the body topicality gate,
//! and the reranker.
//!
//! Matching is plain, case-sensitive substring containment, compiled into one
//! Aho-Corasick automaton per table.

use aho_corasick::AhoCorasick;
use anyhow::{Context, Result};

/// Query terms issued against the search capability, in order.
pub const QUERY_TERMS: &[&str] = &[
    "집값",
    "아파트값",
    "매매가격",
    "전세가격",
    "거래량",
    "미분양",
    "입주물량",
    "부동산 대책",
    "공급 대책",
    "규제지역",
    "토지거래허가구역",
    "금리 부동산",
    "LTV DSR",
    "보유세 종부세",
    "취득세 양도세",
    "한국부동산원 지수",
    "KB시세 동향",
    "국토부 발표",
];

/// A title must contain at least one of these to enter the candidate pool.
const CORE_TOPIC: &[&str] = &[
    "집값",
    "아파트값",
    "매매가격",
    "전세가격",
    "전셋값",
    "가격지수",
    "KB시세",
    "한국부동산원",
    "거래량",
    "거래절벽",
    "매물",
    "수급",
    "공급",
    "입주물량",
    "분양물량",
    "미분양",
    "대책",
    "공급대책",
    "규제지역",
    "토지거래허가",
    "정비사업",
    "재건축",
    "재개발",
    "금리",
    "기준금리",
    "LTV",
    "DSR",
    "대출규제",
    "전세대출",
    "보유세",
    "종부세",
    "취득세",
    "양도세",
];

/// Opinion pieces, unrelated desks, and financial-product spam.
const BLACKLIST: &[&str] = &[
    "사설",
    "칼럼",
    "opinion",
    "기고",
    "만평",
    "상담",
    "연예",
    "게임",
    "스포츠",
    "화재",
    "폭발",
    "사고",
    "체납",
    "횡령",
    "체포",
    "ETF",
    "펀드",
    "주식",
    "채권",
    "선물",
    "옵션",
    "코인",
    "비트코인",
    "웹3",
    "가상자산",
];

/// Extra body vocabulary on top of [`CORE_TOPIC`] for the topicality gate.
const DOMAIN_EXTRA: &[&str] = &[
    "시장동향",
    "지표",
    "전망",
    "심리지수",
    "낙찰가율",
    "경매",
    "거래대금",
    "한강벨트",
    "강남3구",
    "수도권",
    "지방",
    "광역시",
    "학군지",
    "특별건축구역",
    "인허가",
    "도시개발",
    "택지개발",
    "공공주택",
    "PF",
    "전월세",
    "임대차",
    "갭투자",
    "보증금",
    "국토교통부",
    "기획재정부",
    "금융위원회",
    "한국은행",
    "HUG",
    "LH",
    "정책브리핑",
];

const TITLE_BONUS: &[&str] = &[
    "공급",
    "규제",
    "완화",
    "강화",
    "인허가",
    "정비사업",
    "미분양",
    "실거래",
    "LH",
    "대출",
    "세제",
];

const TITLE_PENALTY: &[&str] = &["설문", "전망", "예상", "예측", "인터뷰"];

/// A compiled set of substrings.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    patterns: Vec<String>,
    automaton: AhoCorasick,
}

impl KeywordSet {
    /// Compiles a set; duplicate patterns are folded so that hit counts stay distinct.
    ///
    /// # Errors
    /// Fails when the automaton cannot be built.
    pub fn new<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for pattern in patterns {
            let pattern = pattern.into();
            if !pattern.is_empty() && !unique.contains(&pattern) {
                unique.push(pattern);
            }
        }
        let automaton = AhoCorasick::new(&unique).context("failed to build keyword automaton")?;
        Ok(Self {
            patterns: unique,
            automaton,
        })
    }

    #[must_use]
    pub fn contains_any(&self, text: &str) -> bool {
        !self.patterns.is_empty() && self.automaton.is_match(text)
    }

    /// Number of distinct patterns that occur in `text`.
    #[must_use]
    pub fn distinct_hits(&self, text: &str) -> usize {
        if self.patterns.is_empty() {
            return 0;
        }
        let mut seen = vec![false; self.patterns.len()];
        for found in self.automaton.find_overlapping_iter(text) {
            seen[found.pattern().as_usize()] = true;
        }
        seen.into_iter().filter(|hit| *hit).count()
    }
}

/// Every keyword table the pipeline consults.
#[derive(Debug, Clone)]
pub struct KeywordTables {
    pub core_topic: KeywordSet,
    pub blacklist: KeywordSet,
    pub domain: KeywordSet,
    pub title_bonus: KeywordSet,
    pub title_penalty: KeywordSet,
}

impl KeywordTables {
    /// Builds the built-in Korean real-estate tables.
    ///
    /// # Errors
    /// Fails when any automaton cannot be built.
    pub fn default_tables() -> Result<Self> {
        Ok(Self {
            core_topic: KeywordSet::new(CORE_TOPIC.iter().copied())?,
            blacklist: KeywordSet::new(BLACKLIST.iter().copied())?,
            domain: KeywordSet::new(CORE_TOPIC.iter().chain(DOMAIN_EXTRA).copied())?,
            title_bonus: KeywordSet::new(TITLE_BONUS.iter().copied())?,
            title_penalty: KeywordSet::new(TITLE_PENALTY.iter().copied())?,
        })
    }

    /// Title pre-filter: no blacklisted token and at least one core-topic token.
    #[must_use]
    pub fn title_passes(&self, title: &str) -> bool {
        !self.blacklist.contains_any(title) && self.core_topic.contains_any(title)
    }

    /// Body topicality gate.
    #[must_use]
    pub fn body_is_on_topic(&self, body: &str, min_hits: usize) -> bool {
        self.domain.distinct_hits(body) >= min_hits
    }
}
