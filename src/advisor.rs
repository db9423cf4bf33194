//! Rule-based financial advice engine
//!
//! Maps free-text input to a canned advisory response using an ordered list
//! of keyword category rules, then an FAQ lookup, then a generic fallback.
//! Pure and deterministic; no I/O. Used whenever the remote backend is
//! unreachable or errors.

use crate::models::FaqEntry;

/// One category rule: first rule whose keyword set matches wins.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub advice: &'static str,
}

/// Ordered category rules, static data, zero allocation.
///
/// Matching is substring-based, so more specific rules must precede more
/// general ones: "credit card" is handled by the debt rule before the
/// credit-score rule ever sees bare "credit".
pub const CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        name: "investing",
        keywords: &["invest", "investing", "investment"],
        advice: "For beginners, I recommend starting with low-cost index funds or ETFs. They provide instant diversification and historically solid returns. Consider opening a tax-advantaged account like an IRA or 401(k) first. Remember to only invest money you won't need for at least 5-10 years.",
    },
    CategoryRule {
        name: "budgeting",
        keywords: &["budget", "budgeting", "expenses"],
        advice: "A good budgeting strategy is the 50/30/20 rule: 50% for needs (rent, groceries, utilities), 30% for wants (entertainment, dining out), and 20% for savings and debt repayment. Track your expenses for a month to see where your money actually goes, then adjust accordingly.",
    },
    CategoryRule {
        name: "emergency_fund",
        keywords: &["emergency fund", "emergency", "savings"],
        advice: "Aim to save 3-6 months of living expenses in an easily accessible account. Start with $1,000 as your initial goal, then gradually build up. Keep this money in a high-yield savings account or money market account for better returns while maintaining liquidity.",
    },
    CategoryRule {
        name: "debt",
        keywords: &["debt", "credit card", "loan"],
        advice: "Focus on paying off high-interest debt first (like credit cards). Consider the debt avalanche method: pay minimums on all debts, then put extra money toward the highest interest rate debt. For lower interest debt, you might consider investing instead if you can earn higher returns.",
    },
    CategoryRule {
        name: "credit_score",
        keywords: &["credit score", "credit"],
        advice: "To improve your credit score: pay all bills on time (35% of score), keep credit utilization below 30% (30% of score), maintain old accounts to increase credit history length (15%), limit new credit inquiries (10%), and have a mix of credit types (10%). Check your credit report annually for errors.",
    },
    CategoryRule {
        name: "retirement",
        keywords: &["retirement", "401k", "ira"],
        advice: "Start retirement saving as early as possible to benefit from compound interest. Contribute enough to your 401(k) to get the full company match (free money!). Then consider maxing out a Roth IRA. For 2024, you can contribute up to $23,000 to a 401(k) and $7,000 to an IRA ($8,000 if 50+).",
    },
    // Extended categories, appended after the original six so they can
    // never shadow the original ordering.
    CategoryRule {
        name: "housing",
        keywords: &["mortgage", "house", "home buying", "down payment"],
        advice: "Before buying a home, aim for a 20% down payment to avoid PMI, and keep total housing costs under 28% of your gross income. Get pre-approved to understand your real budget, and plan for closing costs, property taxes, and maintenance of roughly 1-2% of the home's value per year.",
    },
    CategoryRule {
        name: "insurance",
        keywords: &["insurance", "insured", "premium"],
        advice: "Prioritize health insurance first, then term life insurance if others depend on your income (10-12x annual income is a common guideline). Disability insurance protects your ability to earn and is often overlooked. Shop around for auto and home policies annually to keep premiums competitive.",
    },
    CategoryRule {
        name: "tax",
        keywords: &["tax"],
        advice: "Maximize tax-advantaged accounts first: 401(k), IRA, and HSA contributions all reduce taxable income. Keep records of deductible expenses, consider harvesting investment losses to offset gains, and if your situation is complex, a good CPA often saves more than they cost.",
    },
    CategoryRule {
        name: "education",
        keywords: &["college", "education", "529", "student"],
        advice: "For education savings, a 529 plan offers tax-free growth when used for qualified expenses, and starting early lets even small monthly contributions compound significantly. Exhaust scholarships, grants, and federal loans before considering private loans.",
    },
];

/// Fixed FAQ catalog, checked after the category rules.
pub const FAQ_CATALOG: &[FaqEntry] = &[
    FaqEntry {
        question: "How do I start investing?",
        answer: "Start by setting financial goals, building an emergency fund, paying off high-interest debt, and then consider investing in index funds or ETFs for beginners.",
    },
    FaqEntry {
        question: "What's the difference between stocks and bonds?",
        answer: "Stocks represent ownership in a company, while bonds are debt instruments where you lend money to an entity. Stocks typically offer higher returns with higher risk, bonds offer more stable returns with lower risk.",
    },
    FaqEntry {
        question: "How much should I save for retirement?",
        answer: "A common guideline is to save 15-20% of your income for retirement. Consider using tax-advantaged accounts like 401(k)s or IRAs.",
    },
    FaqEntry {
        question: "How do I improve my credit score?",
        answer: "Pay bills on time, reduce debt, maintain low credit utilization, avoid opening too many new accounts, and regularly monitor your credit report.",
    },
    FaqEntry {
        question: "What is dollar-cost averaging?",
        answer: "Dollar-cost averaging is an investment strategy where you invest a fixed amount regularly, regardless of market conditions, which can reduce the impact of volatility.",
    },
    FaqEntry {
        question: "Should I pay off debt or invest?",
        answer: "Generally, prioritize high-interest debt (like credit cards) before investing, but consider the interest rate and potential investment returns in your decision.",
    },
];

const GENERIC_FALLBACK: &str = "I'm here to help with your financial questions! I can provide advice on investing, budgeting, saving, debt management, credit scores, retirement planning, insurance, taxes, and more. Feel free to ask about any specific financial topic, or click on the FAQ questions in the sidebar for common advice.";

/// Map free-text input to an advisory response.
///
/// Evaluation order is fixed: category rules top to bottom (first match
/// wins, later rules never run), then the FAQ catalog, then the generic
/// fallback. Callers must guard empty/whitespace-only input; an empty
/// string would trivially satisfy the FAQ containment heuristic.
pub fn advise(text: &str) -> &'static str {
    let input = text.to_lowercase();

    for rule in CATEGORY_RULES {
        if rule.keywords.iter().any(|kw| input.contains(kw)) {
            return rule.advice;
        }
    }

    if let Some(entry) = match_faq(&input) {
        return entry.answer;
    }

    GENERIC_FALLBACK
}

/// FAQ heuristic: an entry matches if its question (lower-cased) contains
/// the whole input, or the input contains the first three words of the
/// question. First catalog entry wins. The heuristic is intentionally loose
/// for short inputs and is preserved as-is.
fn match_faq(input: &str) -> Option<&'static FaqEntry> {
    FAQ_CATALOG.iter().find(|entry| {
        let question = entry.question.to_lowercase();
        let prefix = question
            .split_whitespace()
            .take(3)
            .collect::<Vec<_>>()
            .join(" ");

        question.contains(input) || input.contains(&prefix)
    })
}
