//! Builds the prompts sent to the model.
//!
//! The advice block at the end of the position prompt is a contract: the
//! labels demanded here are exactly the labels `crate::parser` knows how to
//! read back. Change one and you must change the other.

use core_types::{AnalysisContext, NewsArticle};
use rust_decimal::Decimal;
use std::fmt::Write;

/// How many articles are quoted in a prompt; more adds cost, not signal.
const NEWS_IN_PROMPT: usize = 3;

pub const POSITION_SYSTEM: &str = "You are a professional equity analyst. You assess company \
fundamentals, industry outlook, recent news, and financial figures, and you give concrete, \
actionable trading advice.";

pub const RECOMMEND_SYSTEM: &str = "You are a professional investment advisor. Recommend stocks \
based on news flow, and always identify each one by its exact six-digit security code.";

pub const DEEP_ANALYSIS_SYSTEM: &str = "You are a professional investment advisor. Give a \
detailed, structured analysis with concrete entry ranges, position sizes, and exit levels. Do \
not guess current prices; reason from the technical indicators provided.";

fn push_news(prompt: &mut String, news: &[NewsArticle]) {
    for (i, article) in news.iter().take(NEWS_IN_PROMPT).enumerate() {
        let _ = write!(
            prompt,
            "\nNews {n}:\nTitle: {title}\nTime: {time}\nContent: {content}\n",
            n = i + 1,
            title = article.title,
            time = article.published,
            content = article.content,
        );
    }
    if news.is_empty() {
        prompt.push_str("\n(no recent news found)\n");
    }
}

fn fmt_opt(value: Option<Decimal>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

/// The per-position analysis prompt: everything known about one security,
/// then the demand for a machine-readable advice block.
pub fn position_analysis(ctx: &AnalysisContext) -> String {
    let mut prompt = String::new();

    let _ = write!(
        prompt,
        "Please analyze the investment case for the following security and give concrete \
trading advice.\n\n1. Basic information:\nCode: {code}\nName: {name}\nIndustry: {industry}\n\
Main business: {business}\n\n2. Recent news:\n",
        code = ctx.profile.code,
        name = ctx.profile.name,
        industry = ctx.profile.industry,
        business = ctx.profile.main_business,
    );

    push_news(&mut prompt, &ctx.news);

    let _ = write!(
        prompt,
        "\n3. Key financial figures:\nRevenue: {revenue}\nNet profit: {profit}\nGross margin: \
{margin}\nROE: {roe}\n",
        revenue = fmt_opt(ctx.financials.revenue),
        profit = fmt_opt(ctx.financials.net_profit),
        margin = fmt_opt(ctx.financials.gross_margin),
        roe = fmt_opt(ctx.financials.roe),
    );

    if let Some(tech) = &ctx.technicals {
        let _ = write!(
            prompt,
            "\n4. Technical indicators:\nMA5: {ma5}\nMA10: {ma10}\nMA20: {ma20}\nLatest volume: \
{volume}\nTurnover rate: {turnover}\n",
            ma5 = fmt_opt(tech.ma5),
            ma10 = fmt_opt(tech.ma10),
            ma20 = fmt_opt(tech.ma20),
            volume = tech.volume,
            turnover = fmt_opt(tech.turnover_rate),
        );
    }

    if let Some(held) = &ctx.held {
        let _ = write!(
            prompt,
            "\n5. Current position:\nShares held: {qty}\nAverage cost: {cost}\n",
            qty = held.quantity,
            cost = held.average_cost,
        );
    }

    prompt.push_str(
        "\nCover the following in your analysis:\n\
1. Company fundamentals\n\
2. Industry outlook\n\
3. Impact of the recent news\n\
4. Financial health\n\
5. Concrete trading advice\n\
\n\
You must end with an advice block in exactly this format, every field present and filled \
with a specific value:\n\
\n\
Action: [buy/sell/hold]\n\
Target price: [number]\n\
Quantity: [number of shares]\n\
Stop loss: [number]\n\
Take profit: [number]\n\
Holding period: [number of trading days]\n\
Risk level: [low/medium/high]\n\
\n\
Rules:\n\
1. Every value must be a single specific number or keyword, never a range or a hedge.\n\
2. Prices must have at most two decimal places.\n\
3. Quantity must be a multiple of 100.\n\
4. Write the analysis first, then the advice block as the final lines.\n",
    );

    prompt
}

/// Stage one of the market scan: ask for securities worth watching, given the
/// day's news.
pub fn market_recommendation(news: &[NewsArticle], max_news: usize) -> String {
    let mut prompt =
        String::from("Please analyze today's market news and recommend 3-5 stocks worth watching.\n\n1. Today's news:\n");

    for (i, article) in news.iter().take(max_news).enumerate() {
        let _ = write!(
            prompt,
            "\nNews {n}:\nTitle: {title}\nTime: {time}\nContent: {content}\n",
            n = i + 1,
            title = article.title,
            time = article.published,
            content = article.content,
        );
    }

    prompt.push_str(
        "\nBased on this news, describe the current market environment and recommend 3-5 stocks. \
For each one give:\n\
1. The six-digit security code (for example 000001 or 600000)\n\
2. Why you recommend it\n\
3. Its industry\n\
\n\
Do not assume or invent current prices; realtime data is fetched separately.\n",
    );

    prompt
}

/// Stage two of the market scan: a deep dive over the fetched details of each
/// recommended security.
pub fn deep_analysis(candidates: &[AnalysisContext], available_cash: Decimal) -> String {
    let mut prompt = format!(
        "Please analyze the following securities in depth and give concrete advice.\n\n\
Available cash: {available_cash}\n\nCandidate details:\n"
    );

    for ctx in candidates {
        let _ = write!(
            prompt,
            "\n--- {code} {name} ({industry}) ---\nMain business: {business}\nRevenue: {revenue}, \
net profit: {profit}, ROE: {roe}\n",
            code = ctx.profile.code,
            name = ctx.profile.name,
            industry = ctx.profile.industry,
            business = ctx.profile.main_business,
            revenue = fmt_opt(ctx.financials.revenue),
            profit = fmt_opt(ctx.financials.net_profit),
            roe = fmt_opt(ctx.financials.roe),
        );
        if let Some(tech) = &ctx.technicals {
            let _ = write!(
                prompt,
                "MA5/MA10/MA20: {} / {} / {}\n",
                fmt_opt(tech.ma5),
                fmt_opt(tech.ma10),
                fmt_opt(tech.ma20),
            );
        }
        push_news(&mut prompt, &ctx.news);
    }

    prompt.push_str(
        "\nFor every candidate, state clearly:\n\
1. Whether it is worth buying now\n\
2. A sensible entry range consistent with the technical indicators\n\
3. A target price and a stop-loss level\n\
4. A suggested position size given the available cash (never all of it in one security)\n\
5. A holding period and a risk level (low/medium/high)\n\
\n\
Do not assume or invent current prices; reason from the indicators provided.\n",
    );

    prompt
}
