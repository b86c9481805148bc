//! Memo → NAME extraction over the transaction nodes of a document.

use serde::{Deserialize, Serialize};

use crate::errors::{RewriteError, RewriteResult};
use crate::qfx::TransactionInfo;
use crate::rules::RuleTable;
use crate::xml::{Element, NamespaceMap, Path, pretty_print};

pub const TRANSACTION_PATH: &str = ".//STMTTRN";
pub const MEMO_TAG: &str = "MEMO";
pub const NAME_TAG: &str = "NAME";

/// What to do with a transaction whose memo no rule matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnmatchedPolicy {
    /// Abort the run with [`RewriteError::UnmatchedMemo`].
    #[default]
    Fail,
    /// Log a warning and leave the node unchanged.
    Skip,
}

/// Terminal state of one transaction node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// MEMO replaced by NAME.
    Rewritten { rule: usize, name: String },
    /// No rule matched; MEMO kept, no NAME.
    Skipped { memo: String },
    /// Already has a NAME and no MEMO.
    Untouched,
}

/// Counts per outcome over a whole document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub rewritten: usize,
    pub skipped: usize,
    pub untouched: usize,
}

impl RewriteReport {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Rewritten { .. } => self.rewritten += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Untouched => self.untouched += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.rewritten + self.skipped + self.untouched
    }
}

/// Derive a NAME for one `STMTTRN` node from its MEMO and rewrite it in place.
pub fn process_transaction(
    node: &mut Element,
    rules: &RuleTable,
    policy: UnmatchedPolicy,
) -> RewriteResult<Outcome> {
    let memo_count = node.count_children(MEMO_TAG);
    if memo_count > 1 {
        return Err(RewriteError::DuplicateMemo { count: memo_count });
    }

    let info = transaction_info(node);
    let Some(memo_el) = node.child(MEMO_TAG) else {
        if node.child(NAME_TAG).is_some() {
            tracing::debug!("{} already has a NAME", info.label());
            return Ok(Outcome::Untouched);
        }
        return Err(RewriteError::MissingMemo { fitid: info.fitid });
    };

    let memo = memo_el.text.clone().unwrap_or_default();
    tracing::info!("memo: {}", memo);

    match rules.first_match(&memo) {
        Some(matched) => {
            match node.child_mut(NAME_TAG) {
                Some(existing) => {
                    tracing::debug!("Replacing NAME {:?} of {}", existing.text, info.label());
                    existing.text = Some(matched.name.clone());
                }
                None => {
                    node.push_text_child(NAME_TAG, matched.name.clone());
                }
            }
            node.remove_child(MEMO_TAG);
            tracing::info!("name: {} (rule #{})", matched.name, matched.index + 1);
            Ok(Outcome::Rewritten {
                rule: matched.index,
                name: matched.name,
            })
        }
        None => match policy {
            UnmatchedPolicy::Skip => {
                tracing::warn!("Skipping unhandled transaction ({}): {}", info.label(), memo);
                Ok(Outcome::Skipped { memo })
            }
            UnmatchedPolicy::Fail => Err(RewriteError::UnmatchedMemo {
                memo,
                rules_evaluated: rules.len(),
                fitid: info.fitid,
            }),
        },
    }
}

/// Run [`process_transaction`] on every `STMTTRN` under `root`, in document
/// order. The first error aborts the walk.
pub fn process_document(
    root: &mut Element,
    namespaces: &NamespaceMap,
    rules: &RuleTable,
    policy: UnmatchedPolicy,
) -> RewriteResult<RewriteReport> {
    let path = Path::parse(TRANSACTION_PATH);
    let Some(step) = path.last_step() else {
        return Ok(RewriteReport::default());
    };

    let mut report = RewriteReport::default();
    root.try_for_each_descendant_mut(&mut |node: &mut Element| {
        if !step.matches(node, namespaces) {
            return Ok(());
        }
        tracing::info!("{}", "#".repeat(80));
        log_node("trn", node);
        let outcome = process_transaction(node, rules, policy)?;
        log_node("trn", node);
        report.record(&outcome);
        Ok::<(), RewriteError>(())
    })?;

    tracing::info!(
        "Processed {} transaction(s): {} rewritten, {} skipped, {} untouched",
        report.total(),
        report.rewritten,
        report.skipped,
        report.untouched
    );
    Ok(report)
}

fn transaction_info(node: &Element) -> TransactionInfo {
    TransactionInfo::from_element(node).unwrap_or_else(|e| {
        tracing::debug!("Could not read transaction fields: {}", e);
        TransactionInfo {
            fitid: node.child_text("FITID").map(str::to_string),
            ..TransactionInfo::default()
        }
    })
}

fn log_node(label: &str, node: &Element) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        if let Ok(printed) = pretty_print(node) {
            tracing::debug!("{}: {}", label, printed.trim_end());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use crate::xml::{load, parse_str, query_all};
    use rstest::rstest;

    fn trn(memo: &str) -> Element {
        let mut node = Element::new("STMTTRN");
        node.push_text_child("TRNTYPE", "DEBIT");
        node.push_text_child("FITID", "201910040001");
        node.push_text_child(MEMO_TAG, memo);
        node
    }

    #[rstest]
    #[case("Withdrawal from CHASE CREDIT CRD EPAY", "CHASE CREDIT CRD EPAY")]
    #[case("Monthly Interest Paid", "Capital One")]
    #[case("Check #477 Cashed", "Check #477 Cashed")]
    #[case("ATM Withdrawal - CARDTRONICS C2SJ VSD38839 CARSON, CA", "CARDTRONICS C2SJ VSD38839 CARSO")]
    fn test_rewrites_memo_into_name(#[case] memo: &str, #[case] expected: &str) {
        let mut node = trn(memo);
        let outcome = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();

        assert!(matches!(outcome, Outcome::Rewritten { ref name, .. } if name == expected));
        assert_eq!(node.count_children(MEMO_TAG), 0);
        assert_eq!(node.count_children(NAME_TAG), 1);
        assert_eq!(node.child_text(NAME_TAG), Some(expected));
    }

    #[test]
    fn test_name_appended_after_existing_children() {
        let mut node = trn("Prenote");
        process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        let names: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["TRNTYPE", "FITID", "NAME"]);
    }

    #[test]
    fn test_long_capture_truncated_to_31_chars() {
        let long_payee = "A".repeat(50);
        let mut node = trn(&format!("Withdrawal from {long_payee}"));
        process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        assert_eq!(node.child_text(NAME_TAG), Some("A".repeat(31).as_str()));
    }

    #[test]
    fn test_unmatched_fail_names_memo() {
        let mut node = trn("COMPLETELY UNKNOWN TEXT");
        let err = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap_err();

        match err {
            RewriteError::UnmatchedMemo { memo, rules_evaluated, fitid } => {
                assert_eq!(memo, "COMPLETELY UNKNOWN TEXT");
                assert_eq!(rules_evaluated, 9);
                assert_eq!(fitid.as_deref(), Some("201910040001"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unmatched_skip_keeps_node() {
        let mut node = trn("COMPLETELY UNKNOWN TEXT");
        let before = node.clone();
        let outcome = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Skip).unwrap();

        assert_eq!(
            outcome,
            Outcome::Skipped { memo: "COMPLETELY UNKNOWN TEXT".to_string() }
        );
        assert_eq!(node, before);
    }

    #[test]
    fn test_memo_not_trimmed() {
        let table = RuleTable::new(vec![Rule::capture(r"^Prenote", 0).unwrap()]);
        let mut node = trn(" Prenote");
        let result = process_transaction(&mut node, &table, UnmatchedPolicy::Fail);
        assert!(matches!(result, Err(RewriteError::UnmatchedMemo { ref memo, .. }) if memo == " Prenote"));
    }

    #[test]
    fn test_whitespace_memo_kept_verbatim_on_skip() {
        let mut node = parse_str("<STMTTRN>\n  <FITID>1</FITID>\n  <MEMO>   </MEMO>\n</STMTTRN>").unwrap();
        let outcome = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Skip).unwrap();

        assert_eq!(outcome, Outcome::Skipped { memo: "   ".to_string() });
        assert_eq!(node.child_text(MEMO_TAG), Some("   "));
    }

    #[test]
    fn test_memo_with_trailing_newline_matches_anchored_rule() {
        let mut node = trn("Withdrawal from CHASE CREDIT CRD EPAY\n");
        process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        assert_eq!(node.child_text(NAME_TAG), Some("CHASE CREDIT CRD EPAY"));
    }

    #[test]
    fn test_empty_memo_is_unmatched() {
        let mut node = Element::new("STMTTRN");
        node.children.push(Element::new(MEMO_TAG));
        let result = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail);
        assert!(matches!(result, Err(RewriteError::UnmatchedMemo { ref memo, .. }) if memo.is_empty()));
    }

    #[test]
    fn test_already_named_node_untouched() {
        let mut node = trn("Prenote");
        process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        let once = node.clone();

        let outcome = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        assert_eq!(outcome, Outcome::Untouched);
        assert_eq!(node, once);
        assert_eq!(node.count_children(NAME_TAG), 1);
    }

    #[test]
    fn test_existing_name_replaced_not_duplicated() {
        let mut node = parse_str(
            "<STMTTRN><FITID>1</FITID><NAME>CHASE</NAME><MEMO>Withdrawal from CHASE CREDIT CRD EPAY</MEMO></STMTTRN>",
        )
        .unwrap();
        let outcome = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();

        assert!(matches!(outcome, Outcome::Rewritten { rule: 0, .. }));
        assert_eq!(node.count_children(NAME_TAG), 1);
        assert_eq!(node.count_children(MEMO_TAG), 0);
        assert_eq!(node.child_text(NAME_TAG), Some("CHASE CREDIT CRD EPAY"));
        let names: Vec<&str> = node.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["FITID", "NAME"]);
    }

    #[test]
    fn test_missing_memo_and_name() {
        let mut node = Element::new("STMTTRN");
        node.push_text_child("FITID", "42");
        let result = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Skip);
        assert!(matches!(result, Err(RewriteError::MissingMemo { fitid: Some(ref f) }) if f == "42"));
    }

    #[test]
    fn test_duplicate_memo() {
        let mut node = trn("Prenote");
        node.push_text_child(MEMO_TAG, "Prenote");
        let result = process_transaction(&mut node, &RuleTable::default(), UnmatchedPolicy::Fail);
        assert!(matches!(result, Err(RewriteError::DuplicateMemo { count: 2 })));
    }

    #[test]
    fn test_rule_order_decides() {
        let table = RuleTable::new(vec![
            Rule::literal("Withdrawal", "Overlap A").unwrap(),
            Rule::capture(r"^Withdrawal from\s+(.*)$", 1).unwrap(),
        ]);
        let mut node = trn("Withdrawal from CHASE CREDIT CRD EPAY");
        process_transaction(&mut node, &table, UnmatchedPolicy::Fail).unwrap();
        assert_eq!(node.child_text(NAME_TAG), Some("Overlap A"));
    }

    const DOC: &str = r#"<OFX>
  <BANKMSGSRSV1>
    <STMTTRNRS>
      <STMTRS>
        <BANKTRANLIST>
          <STMTTRN><FITID>1</FITID><MEMO>Withdrawal from CHASE CREDIT CRD EPAY</MEMO></STMTTRN>
          <STMTTRN><FITID>2</FITID><MEMO>COMPLETELY UNKNOWN TEXT</MEMO></STMTTRN>
          <STMTTRN><FITID>3</FITID><NAME>Already named</NAME></STMTTRN>
          <STMTTRN><FITID>4</FITID><MEMO>Monthly Interest Paid</MEMO></STMTTRN>
        </BANKTRANLIST>
      </STMTRS>
    </STMTTRNRS>
  </BANKMSGSRSV1>
</OFX>"#;

    #[test]
    fn test_process_document_with_skip() {
        let (mut doc, ns) = load(DOC).unwrap();
        let report = process_document(&mut doc, &ns, &RuleTable::default(), UnmatchedPolicy::Skip).unwrap();

        assert_eq!(report, RewriteReport { rewritten: 2, skipped: 1, untouched: 1 });
        assert_eq!(report.total(), 4);

        let names: Vec<&str> = query_all(&doc, ".//STMTTRN/NAME", &ns)
            .iter()
            .filter_map(|e| e.text.as_deref())
            .collect();
        assert_eq!(names, vec!["CHASE CREDIT CRD EPAY", "Already named", "Capital One"]);

        let memos: Vec<&str> = query_all(&doc, ".//MEMO", &ns)
            .iter()
            .filter_map(|e| e.text.as_deref())
            .collect();
        assert_eq!(memos, vec!["COMPLETELY UNKNOWN TEXT"]);
    }

    #[test]
    fn test_process_document_fail_stops_at_unmatched() {
        let (mut doc, ns) = load(DOC).unwrap();
        let err = process_document(&mut doc, &ns, &RuleTable::default(), UnmatchedPolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("COMPLETELY UNKNOWN TEXT"));
    }

    #[test]
    fn test_process_document_twice_never_duplicates_name() {
        let (mut doc, ns) = load(DOC).unwrap();
        let rules = RuleTable::default();
        process_document(&mut doc, &ns, &rules, UnmatchedPolicy::Skip).unwrap();
        let second = process_document(&mut doc, &ns, &rules, UnmatchedPolicy::Skip).unwrap();

        assert_eq!(second, RewriteReport { rewritten: 0, skipped: 1, untouched: 3 });
        for node in query_all(&doc, ".//STMTTRN", &ns) {
            assert!(node.count_children(NAME_TAG) <= 1);
        }
    }

    #[test]
    fn test_process_document_without_transactions() {
        let mut doc = parse_str("<OFX><SIGNONMSGSRSV1/></OFX>").unwrap();
        let report =
            process_document(&mut doc, &NamespaceMap::new(), &RuleTable::default(), UnmatchedPolicy::Fail).unwrap();
        assert_eq!(report, RewriteReport::default());
    }

    #[test]
    fn test_policy_serde_names() {
        assert_eq!(serde_json::to_string(&UnmatchedPolicy::Skip).unwrap(), "\"skip\"");
        assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Fail);
    }
}
